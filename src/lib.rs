//! # imgscore
//!
//! A Rust library that scores images against a pretrained ONNX
//! image-classification model and reports the most likely label per image
//! with a confidence score.
//!
//! ## Features
//!
//! - Deterministic image preprocessing (decode, resize, pixel extraction)
//! - ONNX Runtime integration with a pooled session engine
//! - Numerically stable softmax and label mapping
//! - Per-item error recovery: one bad image never aborts the batch
//! - Optional bounded parallelism with input-order preservation
//!
//! ## Modules
//!
//! * [`core`] - Error handling, configuration, and tensor aliases
//! * [`inference`] - The inference engine contract and its ONNX Runtime implementation
//! * [`processors`] - Image preprocessing and logit post-processing
//! * [`labels`] - Class-index to label-name table
//! * [`pipeline`] - Record discovery and the scoring pipeline
//! * [`report`] - Reporting collaborators for scored outcomes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imgscore::prelude::*;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let spec = ModelSpec::resnet152v2();
//! let engine = OrtEngine::new(spec.clone(), Path::new("models/resnet152v2.onnx"))?;
//! let labels = LabelTable::from_file(Path::new("models/synset_text.txt"))?;
//!
//! let pipeline = ScoringPipelineBuilder::new()
//!     .engine(Arc::new(engine))
//!     .labels(Arc::new(labels))
//!     .model_spec(spec)
//!     .build()?;
//!
//! let records = vec![ImageRecord::new("images/dog.jpg")];
//! for outcome in pipeline.score(&records)? {
//!     match outcome.result {
//!         Ok(prediction) => println!("{}: {} ({:.1}%)",
//!             prediction.image_path.display(),
//!             prediction.label,
//!             prediction.confidence * 100.0),
//!         Err(e) => eprintln!("{}: {}", outcome.record.path.display(), e),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod inference;
pub mod labels;
pub mod pipeline;
pub mod processors;
pub mod report;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use imgscore::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{ModelSpec, PipelineConfig, ScoreError, ScoreResult};
    pub use crate::inference::{InferenceEngine, OrtEngine};
    pub use crate::labels::LabelTable;
    pub use crate::pipeline::{
        ImageRecord, ItemOutcome, Prediction, ScoringPipeline, ScoringPipelineBuilder,
    };
    pub use crate::report::{Reporter, TracingReporter};
    pub use crate::utils::load_image;
}
