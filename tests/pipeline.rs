//! Integration tests for the scoring pipeline, driven by a stub inference
//! engine so no model file is needed.

use imgscore::core::{
    ModelSpec, ParallelPolicy, PipelineConfig, PixelSpec, ScoreError, ScoreResult, Tensor2D,
    Tensor4D, TensorLayout,
};
use imgscore::inference::{validate_input_shape, InferenceEngine};
use imgscore::labels::LabelTable;
use imgscore::pipeline::{ImageRecord, ScoringPipeline, ScoringPipelineBuilder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Stub engine returning fixed logits for every batch item.
#[derive(Debug)]
struct StubEngine {
    input_hw: (usize, usize),
    logits: Vec<f32>,
    delay: Option<Duration>,
}

impl StubEngine {
    fn new(input_hw: (usize, usize), logits: Vec<f32>) -> Self {
        Self {
            input_hw,
            logits,
            delay: None,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl InferenceEngine for StubEngine {
    fn infer(&self, input: &Tensor4D) -> ScoreResult<Tensor2D> {
        validate_input_shape(self, input)?;
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let batch = input.shape()[0];
        let mut data = Vec::with_capacity(batch * self.logits.len());
        for _ in 0..batch {
            data.extend_from_slice(&self.logits);
        }
        Ok(Tensor2D::from_shape_vec((batch, self.logits.len()), data).expect("stub logits"))
    }

    fn input_signature(&self, batch: usize) -> [usize; 4] {
        [batch, 3, self.input_hw.0, self.input_hw.1]
    }

    fn class_count(&self) -> usize {
        self.logits.len()
    }
}

fn test_spec(height: u32, width: u32, class_count: usize) -> ModelSpec {
    ModelSpec {
        model_name: "stub".to_string(),
        input_name: "data".to_string(),
        output_name: "logits".to_string(),
        input_width: width,
        input_height: height,
        layout: TensorLayout::Nchw,
        pixels: PixelSpec::raw(),
        class_count,
    }
}

fn write_png(dir: &Path, name: &str, seed: u8) -> PathBuf {
    let path = dir.join(name);
    let img = image::RgbImage::from_fn(12, 9, |x, y| {
        image::Rgb([seed, (x % 256) as u8, (y % 256) as u8])
    });
    img.save(&path).expect("write test image");
    path
}

fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"definitely not a png").expect("write corrupt file");
    path
}

fn animal_pipeline(logits: Vec<f32>, config: PipelineConfig) -> ScoringPipeline {
    let labels = LabelTable::from_lines(["cat", "dog", "bird"]);
    ScoringPipelineBuilder::new()
        .engine(Arc::new(StubEngine::new((8, 8), logits)))
        .labels(Arc::new(labels))
        .model_spec(test_spec(8, 8, 3))
        .config(config)
        .build()
        .expect("pipeline builds")
}

#[test]
fn end_to_end_prediction_matches_reference() {
    let dir = TempDir::new().unwrap();
    let pipeline = animal_pipeline(vec![2.0, 1.0, 0.1], PipelineConfig::new());
    let record = ImageRecord::with_label(write_png(dir.path(), "pet.png", 7), "cat");

    let prediction = pipeline.score_single(&record).unwrap();
    assert_eq!(&*prediction.label, "cat");
    assert_eq!(prediction.class_id, 0);
    assert!((prediction.confidence - 0.659).abs() < 1e-3);
    assert_eq!(prediction.true_label.as_deref(), Some("cat"));
}

#[test]
fn corrupt_image_does_not_abort_the_batch() {
    let dir = TempDir::new().unwrap();
    let pipeline = animal_pipeline(vec![0.1, 3.0, 0.2], PipelineConfig::new());
    let records = vec![
        ImageRecord::new(write_png(dir.path(), "a.png", 1)),
        ImageRecord::new(write_corrupt(dir.path(), "broken.png")),
        ImageRecord::new(write_png(dir.path(), "c.png", 3)),
    ];

    let outcomes = pipeline.score(&records).unwrap();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(&*outcomes[0].prediction().unwrap().label, "dog");
    assert!(matches!(
        outcomes[1].error(),
        Some(ScoreError::ImageDecode { .. })
    ));
    assert_eq!(&*outcomes[2].prediction().unwrap().label, "dog");
}

#[test]
fn fail_fast_aborts_on_first_error() {
    let dir = TempDir::new().unwrap();
    let pipeline = animal_pipeline(
        vec![1.0, 0.0, 0.0],
        PipelineConfig::new().with_fail_fast(true),
    );
    let records = vec![
        ImageRecord::new(write_png(dir.path(), "ok.png", 1)),
        ImageRecord::new(write_corrupt(dir.path(), "broken.png")),
        ImageRecord::new(write_png(dir.path(), "never.png", 2)),
    ];

    let err = pipeline.score(&records).unwrap_err();
    assert!(matches!(err, ScoreError::ImageDecode { .. }));
}

#[test]
fn shape_mismatch_is_reported_per_item() {
    let dir = TempDir::new().unwrap();
    // Preprocessor produces 16x16 tensors; the engine expects 8x8.
    let labels = LabelTable::from_lines(["cat", "dog", "bird"]);
    let pipeline = ScoringPipelineBuilder::new()
        .engine(Arc::new(StubEngine::new((8, 8), vec![0.0, 0.0, 1.0])))
        .labels(Arc::new(labels))
        .model_spec(test_spec(16, 16, 3))
        .build()
        .unwrap();

    let records = vec![ImageRecord::new(write_png(dir.path(), "a.png", 1))];
    let outcomes = pipeline.score(&records).unwrap();
    assert!(matches!(
        outcomes[0].error(),
        Some(ScoreError::ShapeMismatch { .. })
    ));
}

#[test]
fn parallel_scoring_preserves_input_order() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::new().with_parallel(
        ParallelPolicy::default()
            .with_max_threads(Some(4))
            .with_item_threshold(0),
    );
    let pipeline = animal_pipeline(vec![0.5, 0.2, 0.1], config);

    let records: Vec<ImageRecord> = (0..100)
        .map(|i| {
            ImageRecord::new(write_png(
                dir.path(),
                &format!("img_{i:03}.png"),
                (i % 256) as u8,
            ))
        })
        .collect();

    let outcomes = pipeline.score(&records).unwrap();
    assert_eq!(outcomes.len(), records.len());
    for (record, outcome) in records.iter().zip(&outcomes) {
        assert_eq!(outcome.record.path, record.path);
        assert_eq!(outcome.prediction().unwrap().image_path, record.path);
    }
}

#[test]
fn slow_inference_times_out_per_item() {
    let dir = TempDir::new().unwrap();
    let labels = LabelTable::from_lines(["cat", "dog", "bird"]);
    let engine =
        StubEngine::new((8, 8), vec![1.0, 0.0, 0.0]).with_delay(Duration::from_millis(500));
    let pipeline = ScoringPipelineBuilder::new()
        .engine(Arc::new(engine))
        .labels(Arc::new(labels))
        .model_spec(test_spec(8, 8, 3))
        .config(PipelineConfig::new().with_timeout(Some(Duration::from_millis(20))))
        .build()
        .unwrap();

    let records = vec![ImageRecord::new(write_png(dir.path(), "slow.png", 1))];
    let outcomes = pipeline.score(&records).unwrap();
    assert!(matches!(
        outcomes[0].error(),
        Some(ScoreError::Timeout { .. })
    ));
}

#[test]
fn builder_rejects_label_table_mismatch() {
    let labels = LabelTable::from_lines(["cat", "dog"]);
    let err = ScoringPipelineBuilder::new()
        .engine(Arc::new(StubEngine::new((8, 8), vec![0.0, 0.0, 0.0])))
        .labels(Arc::new(labels))
        .model_spec(test_spec(8, 8, 3))
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ScoreError::LabelIndex {
            classes: 3,
            labels: 2
        }
    ));
}

#[test]
fn identical_files_produce_identical_tensors() {
    use imgscore::processors::ImagePreprocessor;

    let dir = TempDir::new().unwrap();
    let path = write_png(dir.path(), "same.png", 42);
    let pre = ImagePreprocessor::from_spec(&test_spec(8, 8, 3));

    let a = pre.prepare(&path).unwrap();
    let b = pre.prepare(&path).unwrap();
    assert_eq!(a, b);
}

#[test]
fn empty_batch_scores_to_empty_outcomes() {
    let pipeline = animal_pipeline(vec![1.0, 0.0, 0.0], PipelineConfig::new());
    let outcomes = pipeline.score(&[]).unwrap();
    assert!(outcomes.is_empty());
}
