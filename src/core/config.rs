//! Configuration types for the scoring pipeline.
//!
//! The model's tensor contract (input/output names, spatial size, channel
//! layout, pixel value regime) is carried by an explicit [`ModelSpec`] value
//! rather than compile-time constants, so different models with different
//! signatures can be scored without code changes.

use crate::core::errors::{ScoreError, ScoreResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Memory layout of the model's image input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TensorLayout {
    /// Channels-first: (batch, channel, height, width).
    #[default]
    Nchw,
    /// Channels-last: (batch, height, width, channel).
    Nhwc,
}

/// Pixel value regime the model was trained on.
///
/// Extraction applies `value * scale / std - mean / std` per channel, the
/// same affine form the normalization literature uses. The default is the
/// raw 0-255 regime of the reference ResNet-152 v2 export: scale 1, zero
/// mean, unit std.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixelSpec {
    /// Scaling factor applied to every channel value.
    #[serde(default = "PixelSpec::default_scale")]
    pub scale: f32,
    /// Per-channel mean subtracted after scaling.
    #[serde(default = "PixelSpec::default_mean")]
    pub mean: [f32; 3],
    /// Per-channel standard deviation divisor.
    #[serde(default = "PixelSpec::default_std")]
    pub std: [f32; 3],
}

impl PixelSpec {
    fn default_scale() -> f32 {
        1.0
    }

    fn default_mean() -> [f32; 3] {
        [0.0, 0.0, 0.0]
    }

    fn default_std() -> [f32; 3] {
        [1.0, 1.0, 1.0]
    }

    /// Raw 0-255 float pixels, no normalization.
    pub fn raw() -> Self {
        Self::default()
    }

    /// The ImageNet normalization regime: scale to 0-1, subtract the
    /// channel means, divide by the channel standard deviations.
    pub fn imagenet() -> Self {
        Self {
            scale: 1.0 / 255.0,
            mean: [0.485, 0.456, 0.406],
            std: [0.229, 0.224, 0.225],
        }
    }

    /// Validates the pixel spec.
    ///
    /// # Errors
    ///
    /// Returns a config error if the scale is not positive or any standard
    /// deviation is not positive.
    pub fn validate(&self) -> ScoreResult<()> {
        if self.scale <= 0.0 {
            return Err(ScoreError::config(format!(
                "pixel scale must be greater than 0, got {}",
                self.scale
            )));
        }
        for (i, &s) in self.std.iter().enumerate() {
            if s <= 0.0 {
                return Err(ScoreError::config(format!(
                    "pixel std at channel {i} must be greater than 0, got {s}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PixelSpec {
    fn default() -> Self {
        Self {
            scale: Self::default_scale(),
            mean: Self::default_mean(),
            std: Self::default_std(),
        }
    }
}

/// The model's tensor contract.
///
/// The two tensor names and the two shapes are the entire contract with the
/// inference collaborator: a fixed-shape image tensor goes in under
/// `input_name`, a flat logits tensor of `class_count` values comes back
/// under `output_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Name of the model, used in logs.
    pub model_name: String,
    /// Name of the model's input tensor slot.
    pub input_name: String,
    /// Name of the model's output tensor slot.
    pub output_name: String,
    /// Expected input width in pixels.
    pub input_width: u32,
    /// Expected input height in pixels.
    pub input_height: u32,
    /// Channel layout of the input tensor.
    #[serde(default)]
    pub layout: TensorLayout,
    /// Pixel value regime the model was trained on.
    #[serde(default)]
    pub pixels: PixelSpec,
    /// Number of classes in the output tensor.
    pub class_count: usize,
}

impl ModelSpec {
    /// The reference ResNet-152 v2 ImageNet export this pipeline was built
    /// against: 224x224 RGB input under "data", 1000 logits under
    /// "resnetv27_dense0_fwd", raw 0-255 channels-first pixels.
    pub fn resnet152v2() -> Self {
        Self {
            model_name: "resnet152v2".to_string(),
            input_name: "data".to_string(),
            output_name: "resnetv27_dense0_fwd".to_string(),
            input_width: 224,
            input_height: 224,
            layout: TensorLayout::Nchw,
            pixels: PixelSpec::raw(),
            class_count: 1000,
        }
    }

    /// Returns the expected input tensor shape for the given batch size.
    pub fn input_signature(&self, batch: usize) -> [usize; 4] {
        let (h, w) = (self.input_height as usize, self.input_width as usize);
        match self.layout {
            TensorLayout::Nchw => [batch, 3, h, w],
            TensorLayout::Nhwc => [batch, h, w, 3],
        }
    }

    /// Validates the model spec.
    ///
    /// # Errors
    ///
    /// Returns a config error if a tensor name is empty, a spatial dimension
    /// is zero, the class count is zero, or the pixel spec is invalid.
    pub fn validate(&self) -> ScoreResult<()> {
        if self.input_name.is_empty() {
            return Err(ScoreError::config("model input tensor name is empty"));
        }
        if self.output_name.is_empty() {
            return Err(ScoreError::config("model output tensor name is empty"));
        }
        if self.input_width == 0 || self.input_height == 0 {
            return Err(ScoreError::config(format!(
                "model input dimensions must be non-zero, got {}x{}",
                self.input_width, self.input_height
            )));
        }
        if self.class_count == 0 {
            return Err(ScoreError::config("model class count must be non-zero"));
        }
        self.pixels.validate()
    }
}

/// Configuration for parallel scoring behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelPolicy {
    /// Maximum number of worker threads. If None, rayon's default pool size
    /// (typically the number of CPU cores) is used.
    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Batches with at most this many records are scored sequentially.
    #[serde(default = "ParallelPolicy::default_item_threshold")]
    pub item_threshold: usize,
}

impl ParallelPolicy {
    fn default_item_threshold() -> usize {
        1
    }

    /// Creates a policy that always scores sequentially.
    pub fn sequential() -> Self {
        Self {
            max_threads: Some(1),
            item_threshold: usize::MAX,
        }
    }

    /// Sets the maximum number of worker threads.
    pub fn with_max_threads(mut self, max_threads: Option<usize>) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Sets the sequential item threshold.
    pub fn with_item_threshold(mut self, threshold: usize) -> Self {
        self.item_threshold = threshold;
        self
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self {
            max_threads: None,
            item_threshold: Self::default_item_threshold(),
        }
    }
}

/// Configuration for the scoring pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    /// Abort the whole run on the first per-item error instead of recording
    /// it and continuing.
    #[serde(default)]
    pub fail_fast: bool,

    /// Optional per-item inference deadline. A call that exceeds it is
    /// reported as a timeout for that item only.
    #[serde(default)]
    pub timeout: Option<Duration>,

    /// Parallelism policy for scoring batches.
    #[serde(default)]
    pub parallel: ParallelPolicy,
}

impl PipelineConfig {
    /// Creates a pipeline configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets fail-fast mode.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Sets the per-item inference deadline.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the parallelism policy.
    pub fn with_parallel(mut self, parallel: ParallelPolicy) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the pipeline configuration.
    pub fn validate(&self) -> ScoreResult<()> {
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(ScoreError::config("inference timeout must be non-zero"));
            }
        }
        if self.parallel.max_threads == Some(0) {
            return Err(ScoreError::config("max_threads must be at least 1"));
        }
        Ok(())
    }
}
