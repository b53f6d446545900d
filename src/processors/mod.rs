//! Image preprocessing and logit post-processing.
//!
//! The preprocessing side turns an image file into the tensor the model
//! expects; the post-processing side turns raw logits into ranked,
//! human-readable predictions.

pub mod pixel_extract;
pub mod preprocess;
pub mod resize;
pub mod softmax;

pub use pixel_extract::PixelExtractor;
pub use preprocess::ImagePreprocessor;
pub use resize::ResizeToFixed;
pub use softmax::{softmax, softmax_batch, top_k, top_label};
