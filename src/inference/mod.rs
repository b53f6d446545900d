//! The inference engine contract and its ONNX Runtime implementation.
//!
//! The scoring pipeline depends only on the [`InferenceEngine`] trait:
//! given a preprocessed input tensor, produce a logits tensor. The
//! production implementation is [`OrtEngine`]; tests substitute stubs.

pub mod ort_engine;

pub use ort_engine::OrtEngine;

use crate::core::{ScoreError, ScoreResult, Tensor2D, Tensor4D};
use std::fmt::Debug;

/// Contract for model inference.
///
/// An engine accepts a preprocessed image tensor and returns one row of raw
/// logits per batch item. Implementations must validate that the input
/// tensor matches the model's declared input signature and reject
/// mismatches with [`ScoreError::ShapeMismatch`].
pub trait InferenceEngine: Send + Sync + Debug {
    /// Runs the model on a preprocessed input tensor.
    ///
    /// # Arguments
    ///
    /// * `input` - Input tensor matching the model's input signature.
    ///
    /// # Returns
    ///
    /// A (batch, class_count) logits tensor.
    fn infer(&self, input: &Tensor4D) -> ScoreResult<Tensor2D>;

    /// The input tensor shape the model expects for the given batch size.
    fn input_signature(&self, batch: usize) -> [usize; 4];

    /// Number of classes in the model's output tensor.
    fn class_count(&self) -> usize;

    /// Human-readable description of the engine, used in logs.
    fn engine_info(&self) -> String {
        format!("inference engine ({} classes)", self.class_count())
    }
}

/// Validates an input tensor against the engine's declared signature.
///
/// Shared by engine implementations so the shape contract is enforced the
/// same way everywhere.
pub fn validate_input_shape(engine: &dyn InferenceEngine, input: &Tensor4D) -> ScoreResult<()> {
    let batch = input.shape()[0];
    let expected = engine.input_signature(batch);
    if input.shape() != expected {
        return Err(ScoreError::shape_mismatch(&expected, input.shape()));
    }
    Ok(())
}
