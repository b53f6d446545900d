//! The image preprocessor: decode, resize, extract.

use crate::core::{ModelSpec, ScoreResult, Tensor4D};
use crate::processors::{PixelExtractor, ResizeToFixed};
use crate::utils::load_image;
use image::imageops::FilterType;
use image::RgbImage;
use std::path::Path;

/// Prepares image files as model input tensors.
///
/// The preprocessor chains the three deterministic steps the model's tensor
/// contract requires: decode the file to 8-bit RGB (alpha channels and
/// non-RGB color spaces are converted in the process), resize to the spec's
/// spatial resolution, and extract pixels into a tensor in the spec's
/// channel order and value range.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    resize: ResizeToFixed,
    extract: PixelExtractor,
}

impl ImagePreprocessor {
    /// Creates a preprocessor for the given model spec with the default
    /// bilinear resize filter.
    pub fn from_spec(spec: &ModelSpec) -> Self {
        Self {
            resize: ResizeToFixed::new(spec.input_width, spec.input_height),
            extract: PixelExtractor::new(&spec.pixels, spec.layout),
        }
    }

    /// Creates a preprocessor with an explicit resize filter.
    pub fn with_filter(spec: &ModelSpec, filter: FilterType) -> Self {
        Self {
            resize: ResizeToFixed::with_filter(spec.input_width, spec.input_height, filter),
            extract: PixelExtractor::new(&spec.pixels, spec.layout),
        }
    }

    /// Decodes and prepares one image file as a batch-of-one input tensor.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError::ImageDecode`] for unreadable or corrupt files.
    pub fn prepare(&self, path: &Path) -> ScoreResult<Tensor4D> {
        let img = load_image(path)?;
        self.prepare_image(&img)
    }

    /// Prepares an already-decoded RGB image as a batch-of-one input tensor.
    pub fn prepare_image(&self, img: &RgbImage) -> ScoreResult<Tensor4D> {
        let resized = self.resize.apply(img);
        self.extract.extract(&resized)
    }
}
