//! Deterministic fixed-size image resizing.

use image::imageops::FilterType;
use image::RgbImage;

/// Resizes images to a fixed spatial resolution.
///
/// The resize ignores aspect ratio: the model consumes a fixed grid, so the
/// image is stretched to exactly `width` x `height`. The interpolation
/// filter is part of the preprocessing contract and defaults to bilinear
/// (`FilterType::Triangle`); the same input bytes always produce the same
/// output pixels.
#[derive(Debug, Clone)]
pub struct ResizeToFixed {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    /// Interpolation filter used for resampling.
    pub filter: FilterType,
}

impl ResizeToFixed {
    /// Creates a resizer with the default bilinear filter.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            filter: FilterType::Triangle,
        }
    }

    /// Creates a resizer with an explicit interpolation filter.
    pub fn with_filter(width: u32, height: u32, filter: FilterType) -> Self {
        Self {
            width,
            height,
            filter,
        }
    }

    /// Resizes the image to the target resolution.
    ///
    /// Images already at the target size are returned unchanged.
    pub fn apply(&self, img: &RgbImage) -> RgbImage {
        if img.dimensions() == (self.width, self.height) {
            return img.clone();
        }
        image::imageops::resize(img, self.width, self.height, self.filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn resizes_to_target_dimensions() {
        let resize = ResizeToFixed::new(224, 224);
        let out = resize.apply(&gradient_image(640, 480));
        assert_eq!(out.dimensions(), (224, 224));
    }

    #[test]
    fn resize_is_deterministic() {
        let resize = ResizeToFixed::new(64, 64);
        let img = gradient_image(100, 80);
        let a = resize.apply(&img);
        let b = resize.apply(&img);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn exact_size_is_passed_through() {
        let resize = ResizeToFixed::new(32, 32);
        let img = gradient_image(32, 32);
        let out = resize.apply(&img);
        assert_eq!(out.as_raw(), img.as_raw());
    }
}
