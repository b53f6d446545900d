//! Tensor type aliases used throughout the pipeline.
//!
//! Preprocessed image batches travel as 4D tensors (batch, channel, height,
//! width in NCHW layout, or batch, height, width, channel in NHWC layout);
//! classification logits come back as 2D tensors (batch, class count).

/// A 2D tensor of f32 values: one row of class logits per batch item.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4D tensor of f32 values holding a batch of preprocessed images.
pub type Tensor4D = ndarray::Array4<f32>;
