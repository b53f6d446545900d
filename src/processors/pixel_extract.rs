//! Pixel extraction from RGB images into model input tensors.
//!
//! Extraction applies a per-channel affine transform (`value * alpha + beta`)
//! while laying pixels out in the channel order the model expects. The alpha
//! and beta coefficients are derived once from the model's [`PixelSpec`], so
//! the hot loop is a single multiply-add per channel value.

use crate::core::{PixelSpec, ScoreResult, Tensor4D, TensorLayout};
use image::RgbImage;

/// Extracts normalized pixel tensors from RGB images.
#[derive(Debug, Clone)]
pub struct PixelExtractor {
    /// Per-channel scaling factors (alpha = scale / std).
    alpha: [f32; 3],
    /// Per-channel offsets (beta = -mean / std).
    beta: [f32; 3],
    /// Channel layout of the produced tensor.
    layout: TensorLayout,
}

impl PixelExtractor {
    /// Creates an extractor from a pixel spec and target layout.
    ///
    /// The spec must already be validated; see [`PixelSpec::validate`].
    pub fn new(pixels: &PixelSpec, layout: TensorLayout) -> Self {
        let mut alpha = [0.0f32; 3];
        let mut beta = [0.0f32; 3];
        for c in 0..3 {
            alpha[c] = pixels.scale / pixels.std[c];
            beta[c] = -pixels.mean[c] / pixels.std[c];
        }
        Self {
            alpha,
            beta,
            layout,
        }
    }

    /// Extracts a single image into a batch-of-one 4D tensor.
    ///
    /// # Arguments
    ///
    /// * `img` - The RGB image to extract; its dimensions define the tensor's
    ///   spatial shape.
    ///
    /// # Returns
    ///
    /// A (1, 3, H, W) tensor for NCHW layout or (1, H, W, 3) for NHWC.
    pub fn extract(&self, img: &RgbImage) -> ScoreResult<Tensor4D> {
        let (width, height) = img.dimensions();
        let (w, h) = (width as usize, height as usize);

        match self.layout {
            TensorLayout::Nchw => {
                let mut data = vec![0.0f32; 3 * h * w];
                for (x, y, pixel) in img.enumerate_pixels() {
                    let (x, y) = (x as usize, y as usize);
                    for c in 0..3 {
                        data[c * h * w + y * w + x] =
                            pixel[c] as f32 * self.alpha[c] + self.beta[c];
                    }
                }
                Ok(Tensor4D::from_shape_vec((1, 3, h, w), data)?)
            }
            TensorLayout::Nhwc => {
                let mut data = vec![0.0f32; h * w * 3];
                for (x, y, pixel) in img.enumerate_pixels() {
                    let (x, y) = (x as usize, y as usize);
                    for c in 0..3 {
                        data[y * w * 3 + x * 3 + c] =
                            pixel[c] as f32 * self.alpha[c] + self.beta[c];
                    }
                }
                Ok(Tensor4D::from_shape_vec((1, h, w, 3), data)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pixel_image() -> RgbImage {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([255, 0, 128]));
        img.put_pixel(1, 0, image::Rgb([0, 255, 64]));
        img
    }

    #[test]
    fn raw_extraction_keeps_255_range_nchw() {
        let extractor = PixelExtractor::new(&PixelSpec::raw(), TensorLayout::Nchw);
        let tensor = extractor.extract(&two_pixel_image()).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 1, 2]);
        // R plane, then G plane, then B plane.
        assert_eq!(tensor[[0, 0, 0, 0]], 255.0);
        assert_eq!(tensor[[0, 0, 0, 1]], 0.0);
        assert_eq!(tensor[[0, 1, 0, 0]], 0.0);
        assert_eq!(tensor[[0, 1, 0, 1]], 255.0);
        assert_eq!(tensor[[0, 2, 0, 0]], 128.0);
        assert_eq!(tensor[[0, 2, 0, 1]], 64.0);
    }

    #[test]
    fn nhwc_layout_interleaves_channels() {
        let extractor = PixelExtractor::new(&PixelSpec::raw(), TensorLayout::Nhwc);
        let tensor = extractor.extract(&two_pixel_image()).unwrap();
        assert_eq!(tensor.shape(), &[1, 1, 2, 3]);
        assert_eq!(tensor[[0, 0, 0, 0]], 255.0);
        assert_eq!(tensor[[0, 0, 0, 2]], 128.0);
        assert_eq!(tensor[[0, 0, 1, 1]], 255.0);
    }

    #[test]
    fn imagenet_regime_normalizes() {
        let extractor = PixelExtractor::new(&PixelSpec::imagenet(), TensorLayout::Nchw);
        let tensor = extractor.extract(&two_pixel_image()).unwrap();
        // 255 -> (1.0 - 0.485) / 0.229 on the red channel.
        let expected = (1.0 - 0.485) / 0.229;
        assert!((tensor[[0, 0, 0, 0]] - expected).abs() < 1e-5);
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = PixelExtractor::new(&PixelSpec::imagenet(), TensorLayout::Nchw);
        let img = two_pixel_image();
        let a = extractor.extract(&img).unwrap();
        let b = extractor.extract(&img).unwrap();
        assert_eq!(a, b);
    }
}
