//! Utility functions for image loading.

use crate::core::{ScoreError, ScoreResult};
use image::RgbImage;
use std::path::Path;

/// Loads an image from a file path and converts it to 8-bit RGB.
///
/// Alpha channels and non-RGB color spaces are normalized by the
/// conversion.
///
/// # Errors
///
/// Returns [`ScoreError::ImageDecode`] if the file cannot be read or is not
/// a decodable raster image.
pub fn load_image(path: &Path) -> ScoreResult<RgbImage> {
    let img = image::open(path).map_err(|e| ScoreError::image_decode(path, e))?;
    Ok(img.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn decodes_png_and_converts_to_rgb() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("img.png");
        let rgba =
            image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 100, 50, 128]));
        rgba.save(&path).unwrap();

        let img = load_image(&path).unwrap();
        assert_eq!(img.dimensions(), (4, 4));
        assert_eq!(img.get_pixel(0, 0).0, [200, 100, 50]);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image at all").unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, ScoreError::ImageDecode { .. }));
    }
}
