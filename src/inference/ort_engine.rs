//! ONNX Runtime inference engine with a pooled session design.

use crate::core::{ModelSpec, ScoreError, ScoreResult, Tensor2D, Tensor4D};
use crate::inference::{validate_input_shape, InferenceEngine};
use ndarray::ArrayView2;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Inference engine backed by ONNX Runtime.
///
/// Holds a pool of sessions behind mutexes with round-robin dispatch, so
/// concurrent workers can score without serializing on a single session.
/// The input and output tensor names and all shapes come from the
/// [`ModelSpec`]; nothing about the model contract is hard-coded.
pub struct OrtEngine {
    sessions: Vec<Mutex<Session>>,
    next_idx: AtomicUsize,
    spec: ModelSpec,
    model_path: PathBuf,
}

impl std::fmt::Debug for OrtEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtEngine")
            .field("sessions", &self.sessions.len())
            .field("model_name", &self.spec.model_name)
            .field("model_path", &self.model_path)
            .finish()
    }
}

impl OrtEngine {
    /// Creates an engine with a single session.
    ///
    /// # Arguments
    ///
    /// * `spec` - The model's tensor contract.
    /// * `model_path` - Path to the ONNX model file.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::ModelLoad`] if the session cannot be created.
    /// This is fatal for the run: no predictions are possible without a
    /// loaded model.
    pub fn new(spec: ModelSpec, model_path: &Path) -> ScoreResult<Self> {
        Self::with_pool_size(spec, model_path, 1)
    }

    /// Creates an engine with a pool of sessions for concurrent scoring.
    ///
    /// # Arguments
    ///
    /// * `spec` - The model's tensor contract.
    /// * `model_path` - Path to the ONNX model file.
    /// * `pool_size` - Number of sessions to create (minimum 1).
    pub fn with_pool_size(
        spec: ModelSpec,
        model_path: &Path,
        pool_size: usize,
    ) -> ScoreResult<Self> {
        spec.validate()?;
        let pool_size = pool_size.max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let session = Session::builder()?
                .with_log_level(LogLevel::Error)?
                .commit_from_file(model_path)
                .map_err(|e| {
                    ScoreError::model_load(
                        model_path,
                        "failed to create ONNX session; verify the model file exists and is a valid ONNX graph",
                        Some(e),
                    )
                })?;
            sessions.push(Mutex::new(session));
        }

        Ok(Self {
            sessions,
            next_idx: AtomicUsize::new(0),
            spec,
            model_path: model_path.to_path_buf(),
        })
    }

    /// Returns the model path this engine was loaded from.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the model spec this engine validates against.
    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }
}

impl InferenceEngine for OrtEngine {
    fn infer(&self, input: &Tensor4D) -> ScoreResult<Tensor2D> {
        validate_input_shape(self, input)?;
        let batch = input.shape()[0];

        let input_tensor = TensorRef::from_array_view(input.view()).map_err(|e| {
            ScoreError::invalid_input(format!(
                "failed to convert input tensor with shape {:?}: {}",
                input.shape(),
                e
            ))
        })?;
        let inputs = ort::inputs![self.spec.input_name.as_str() => input_tensor];

        let idx = self.next_idx.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut session = self.sessions[idx].lock().map_err(|_| {
            ScoreError::invalid_input(format!(
                "failed to acquire session lock {}/{} for model '{}'",
                idx,
                self.sessions.len(),
                self.spec.model_name
            ))
        })?;

        let outputs = session.run(inputs)?;
        let (output_shape, output_data) = outputs[self.spec.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                ScoreError::invalid_input(format!(
                    "failed to extract output tensor '{}' as f32: {}",
                    self.spec.output_name, e
                ))
            })?;

        // The output contract is one row of class_count logits per item.
        // Models export this as either (batch, classes) or a flat vector.
        let expected_len = batch * self.spec.class_count;
        if output_data.len() != expected_len {
            let actual: Vec<usize> = output_shape.iter().map(|&d| d as usize).collect();
            return Err(ScoreError::shape_mismatch(
                &[batch, self.spec.class_count],
                &actual,
            ));
        }

        let view = ArrayView2::from_shape((batch, self.spec.class_count), output_data)?;
        Ok(view.to_owned())
    }

    fn input_signature(&self, batch: usize) -> [usize; 4] {
        self.spec.input_signature(batch)
    }

    fn class_count(&self) -> usize {
        self.spec.class_count
    }

    fn engine_info(&self) -> String {
        format!(
            "ort model '{}' at '{}' ({} sessions, {} classes)",
            self.spec.model_name,
            self.model_path.display(),
            self.sessions.len(),
            self.spec.class_count
        )
    }
}
