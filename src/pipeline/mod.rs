//! The scoring pipeline: orchestrates preprocess, infer, and postprocess
//! over a collection of image records.
//!
//! The pipeline is stateless between items; the engine and label table are
//! shared read-only, fully initialized before scoring begins and never
//! mutated afterwards. Output order always equals input order, including
//! under parallel scoring.

pub mod discover;

pub use discover::{read_manifest, scan_directory};

use crate::core::{ModelSpec, PipelineConfig, ScoreError, ScoreResult, Tensor2D, Tensor4D};
use crate::inference::InferenceEngine;
use crate::labels::LabelTable;
use crate::processors::{softmax, top_label, ImagePreprocessor};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// A source image to score, with an optional ground-truth label.
///
/// Records are immutable after creation: discovery produces them, the
/// pipeline consumes them read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Path of the image file.
    pub path: PathBuf,
    /// Ground-truth label, when known.
    pub true_label: Option<String>,
}

impl ImageRecord {
    /// Creates a record without a ground-truth label.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            true_label: None,
        }
    }

    /// Creates a record with a ground-truth label.
    pub fn with_label(path: impl Into<PathBuf>, true_label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            true_label: Some(true_label.into()),
        }
    }
}

/// The result of scoring one image.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Path of the scored image.
    pub image_path: PathBuf,
    /// Ground-truth label from the record, when known.
    pub true_label: Option<String>,
    /// The winning label.
    pub label: Arc<str>,
    /// Class index of the winning label.
    pub class_id: usize,
    /// Probability of the winning label, in [0, 1].
    pub confidence: f32,
}

/// One record's outcome: the original record paired with either its
/// prediction or the per-item error that stopped it.
#[derive(Debug)]
pub struct ItemOutcome {
    /// The record that was scored.
    pub record: ImageRecord,
    /// The prediction, or the error that prevented one.
    pub result: ScoreResult<Prediction>,
}

impl ItemOutcome {
    /// Returns the prediction if the item scored successfully.
    pub fn prediction(&self) -> Option<&Prediction> {
        self.result.as_ref().ok()
    }

    /// Returns the error if the item failed.
    pub fn error(&self) -> Option<&ScoreError> {
        self.result.as_ref().err()
    }
}

/// Orchestrates preprocess, inference, and postprocess over image records.
///
/// Per-item failures (decode errors, shape mismatches, timeouts) are
/// captured in the item's outcome and do not abort the rest of the batch
/// unless fail-fast mode is configured.
#[derive(Debug)]
pub struct ScoringPipeline {
    engine: Arc<dyn InferenceEngine>,
    labels: Arc<LabelTable>,
    preprocessor: ImagePreprocessor,
    config: PipelineConfig,
}

impl ScoringPipeline {
    /// Scores a batch of records, preserving input order.
    ///
    /// Batches above the configured item threshold are scored in parallel;
    /// order is still preserved. In fail-fast mode the batch is scored
    /// sequentially and the first error aborts the run.
    ///
    /// # Errors
    ///
    /// Returns an error only for pipeline-wide problems (an invalid worker
    /// pool, or the first per-item error in fail-fast mode). Per-item
    /// errors otherwise land in the corresponding [`ItemOutcome`].
    pub fn score(&self, records: &[ImageRecord]) -> ScoreResult<Vec<ItemOutcome>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            records = records.len(),
            engine = %self.engine.engine_info(),
            "scoring batch"
        );

        if self.config.fail_fast {
            let mut outcomes = Vec::with_capacity(records.len());
            for record in records {
                match self.score_record(record) {
                    Ok(prediction) => outcomes.push(ItemOutcome {
                        record: record.clone(),
                        result: Ok(prediction),
                    }),
                    Err(e) => {
                        warn!(path = %record.path.display(), error = %e, "aborting batch");
                        return Err(e);
                    }
                }
            }
            return Ok(outcomes);
        }

        let outcomes = if records.len() > self.config.parallel.item_threshold {
            self.score_parallel(records)?
        } else {
            records
                .iter()
                .map(|record| ItemOutcome {
                    record: record.clone(),
                    result: self.score_record(record),
                })
                .collect()
        };

        let failures = outcomes.iter().filter(|o| o.result.is_err()).count();
        info!(
            records = records.len(),
            failures, "finished scoring batch"
        );
        Ok(outcomes)
    }

    /// Scores a single record.
    ///
    /// This is the single-image entry point; per-item errors are returned
    /// directly instead of being wrapped in an outcome.
    pub fn score_single(&self, record: &ImageRecord) -> ScoreResult<Prediction> {
        self.score_record(record)
    }

    fn score_parallel(&self, records: &[ImageRecord]) -> ScoreResult<Vec<ItemOutcome>> {
        // Indexed parallel collect keeps outcome order equal to input order.
        let run = || {
            records
                .par_iter()
                .map(|record| ItemOutcome {
                    record: record.clone(),
                    result: self.score_record(record),
                })
                .collect()
        };

        match self.config.parallel.max_threads {
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| {
                        ScoreError::config(format!("failed to build worker pool: {e}"))
                    })?;
                Ok(pool.install(run))
            }
            None => Ok(run()),
        }
    }

    fn score_record(&self, record: &ImageRecord) -> ScoreResult<Prediction> {
        let tensor = self.preprocessor.prepare(&record.path)?;
        let logits = self.infer_with_deadline(tensor)?;
        let row = logits
            .rows()
            .into_iter()
            .next()
            .map(|row| row.to_vec())
            .ok_or_else(|| ScoreError::invalid_input("engine returned an empty logits tensor"))?;
        let probabilities = softmax(&row);
        let (label, confidence, class_id) = top_label(&probabilities, &self.labels)?;

        debug!(
            path = %record.path.display(),
            label = %label,
            confidence,
            "scored image"
        );

        Ok(Prediction {
            image_path: record.path.clone(),
            true_label: record.true_label.clone(),
            label,
            class_id,
            confidence,
        })
    }

    /// Runs inference, honoring the configured per-item deadline.
    ///
    /// With a deadline, the engine call runs on a helper thread; if the
    /// deadline elapses the item is reported as timed out and the helper is
    /// left to finish in the background. Its late result is discarded, so a
    /// stuck call never affects other items.
    fn infer_with_deadline(&self, input: Tensor4D) -> ScoreResult<Tensor2D> {
        let Some(deadline) = self.config.timeout else {
            return self.engine.infer(&input);
        };

        let engine = Arc::clone(&self.engine);
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(engine.infer(&input));
        });

        match rx.recv_timeout(deadline) {
            Ok(result) => result,
            Err(_) => Err(ScoreError::timeout(deadline)),
        }
    }
}

/// Builder for [`ScoringPipeline`].
///
/// Validates the whole configuration up front: an engine whose class count
/// disagrees with the label table is rejected here, before any inference
/// can run.
#[derive(Debug, Default)]
pub struct ScoringPipelineBuilder {
    engine: Option<Arc<dyn InferenceEngine>>,
    labels: Option<Arc<LabelTable>>,
    model_spec: Option<ModelSpec>,
    preprocessor: Option<ImagePreprocessor>,
    config: PipelineConfig,
}

impl ScoringPipelineBuilder {
    /// Creates a builder with default pipeline configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inference engine.
    pub fn engine(mut self, engine: Arc<dyn InferenceEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Sets the label table.
    pub fn labels(mut self, labels: Arc<LabelTable>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Sets the model spec the preprocessor is derived from.
    pub fn model_spec(mut self, spec: ModelSpec) -> Self {
        self.model_spec = Some(spec);
        self
    }

    /// Overrides the derived preprocessor.
    pub fn preprocessor(mut self, preprocessor: ImagePreprocessor) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    /// Sets the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns a config error if a required collaborator is missing or the
    /// configuration is invalid, and [`ScoreError::LabelIndex`] if the
    /// engine's class count does not match the label table length.
    pub fn build(self) -> ScoreResult<ScoringPipeline> {
        let engine = self
            .engine
            .ok_or_else(|| ScoreError::config("scoring pipeline requires an inference engine"))?;
        let labels = self
            .labels
            .ok_or_else(|| ScoreError::config("scoring pipeline requires a label table"))?;

        let preprocessor = match (self.preprocessor, &self.model_spec) {
            (Some(preprocessor), _) => preprocessor,
            (None, Some(spec)) => {
                spec.validate()?;
                ImagePreprocessor::from_spec(spec)
            }
            (None, None) => {
                return Err(ScoreError::config(
                    "scoring pipeline requires a model spec or an explicit preprocessor",
                ))
            }
        };

        self.config.validate()?;

        if engine.class_count() != labels.len() {
            return Err(ScoreError::label_index(engine.class_count(), labels.len()));
        }

        Ok(ScoringPipeline {
            engine,
            labels,
            preprocessor,
            config: self.config,
        })
    }
}
