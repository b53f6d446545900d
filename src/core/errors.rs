//! Error types for the scoring pipeline.
//!
//! This module defines the error taxonomy of the pipeline. Per-item errors
//! (image decode, shape mismatch, timeout) are recovered locally by the
//! scoring pipeline; pipeline-wide errors (model load, label table problems)
//! are fatal and surface before any inference begins.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Enum representing the errors that can occur while scoring images.
#[derive(Error, Debug)]
pub enum ScoreError {
    /// The image file could not be read or decoded.
    #[error("failed to decode image '{}'", path.display())]
    ImageDecode {
        /// Path of the offending image file.
        path: PathBuf,
        /// The underlying decode error.
        #[source]
        source: image::ImageError,
    },

    /// A tensor did not match the model's declared signature.
    #[error("tensor shape {actual:?} does not match model signature {expected:?}")]
    ShapeMismatch {
        /// The shape declared by the model spec.
        expected: Vec<usize>,
        /// The shape that was actually produced.
        actual: Vec<usize>,
    },

    /// The model's class count and the label table length disagree.
    #[error("model produced {classes} classes but the label table has {labels} entries")]
    LabelIndex {
        /// Number of classes in the model output.
        classes: usize,
        /// Number of entries in the label table.
        labels: usize,
    },

    /// The model file could not be loaded. Fatal: no predictions are
    /// possible without a model.
    #[error("failed to load model from '{}': {context}", path.display())]
    ModelLoad {
        /// Path of the model file.
        path: PathBuf,
        /// Additional context about the failure.
        context: String,
        /// The underlying session error, if any.
        #[source]
        source: Option<ort::Error>,
    },

    /// Inference did not complete within the configured deadline.
    #[error("inference did not complete within {waited:?}")]
    Timeout {
        /// The deadline that elapsed.
        waited: Duration,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for scoring operations.
pub type ScoreResult<T> = Result<T, ScoreError>;

impl ScoreError {
    /// Creates a ScoreError for a failed image decode.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the image that failed to decode.
    /// * `source` - The underlying error from the image crate.
    pub fn image_decode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::ImageDecode {
            path: path.into(),
            source,
        }
    }

    /// Creates a ScoreError for a tensor shape mismatch.
    ///
    /// # Arguments
    ///
    /// * `expected` - The shape declared by the model signature.
    /// * `actual` - The shape that was produced.
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Creates a ScoreError for a class-count / label-table disagreement.
    pub fn label_index(classes: usize, labels: usize) -> Self {
        Self::LabelIndex { classes, labels }
    }

    /// Creates a ScoreError for a failed model load.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the model file.
    /// * `context` - Description of what failed.
    /// * `source` - The underlying ONNX Runtime error, if any.
    pub fn model_load(
        path: &Path,
        context: impl Into<String>,
        source: Option<ort::Error>,
    ) -> Self {
        Self::ModelLoad {
            path: path.to_path_buf(),
            context: context.into(),
            source,
        }
    }

    /// Creates a ScoreError for an inference deadline that elapsed.
    pub fn timeout(waited: Duration) -> Self {
        Self::Timeout { waited }
    }

    /// Creates a ScoreError for configuration errors.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a ScoreError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Returns true if the error is recoverable per item: the scoring
    /// pipeline records it against the offending record and keeps going.
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            Self::ImageDecode { .. } | Self::ShapeMismatch { .. } | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_display_includes_both_shapes() {
        let err = ScoreError::shape_mismatch(&[1, 3, 224, 224], &[1, 3, 64, 64]);
        let msg = err.to_string();
        assert!(msg.contains("[1, 3, 224, 224]"));
        assert!(msg.contains("[1, 3, 64, 64]"));
    }

    #[test]
    fn per_item_classification() {
        assert!(ScoreError::shape_mismatch(&[1], &[2]).is_per_item());
        assert!(ScoreError::timeout(Duration::from_secs(1)).is_per_item());
        assert!(!ScoreError::config("bad").is_per_item());
        assert!(!ScoreError::label_index(1000, 999).is_per_item());
    }
}
