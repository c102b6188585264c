//! Image loading and decoding

use crate::AppError;
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Decode an image from disk. The format is sniffed from the content, so a
/// PNG saved with a `.jpg` name still loads.
pub fn load_image(path: &Path) -> Result<DynamicImage, AppError> {
    tracing::debug!("Loading image: {}", path.display());

    let decode_err = |reason: String| AppError::DecodeError {
        file: display_name(path),
        reason,
    };

    let reader = ImageReader::open(path)
        .map_err(|e| decode_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| decode_err(e.to_string()))?;

    reader.decode().map_err(|e| {
        tracing::warn!("Failed to decode {}: {}", path.display(), e);
        decode_err(e.to_string())
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_load_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("front.png");
        RgbImage::from_pixel(12, 7, Rgb([10, 20, 30])).save(&path).unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!((image.width(), image.height()), (12, 7));
    }

    #[test]
    fn test_format_is_sniffed_from_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mislabeled.jpg");
        RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]))
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[test]
    fn test_corrupt_file_reports_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        match load_image(&path) {
            Err(AppError::DecodeError { file, .. }) => assert_eq!(file, "broken.jpg"),
            other => panic!("expected DecodeError, got {:?}", other.map(|_| ())),
        }
    }
}
