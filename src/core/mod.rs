//! The core module of the scoring pipeline.
//!
//! This module contains the fundamental building blocks shared by the rest of
//! the crate:
//! - Error handling
//! - Model and pipeline configuration
//! - Tensor type aliases
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod config;
pub mod errors;
pub mod tensor;

pub use config::{ModelSpec, ParallelPolicy, PipelineConfig, PixelSpec, TensorLayout};
pub use errors::{ScoreError, ScoreResult};
pub use tensor::{Tensor2D, Tensor4D};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and
/// formatting layer. It's typically called at the start of an application to
/// enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
