//! Image preprocessing for vision inference.
//!
//! Images are decoded, shrunk so the longest side fits `max_dimension`, and
//! re-encoded as JPEG to keep the inference payload small.

use std::path::Path;

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, GenericImageView};
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Default cap on the longest side, in pixels.
pub const DEFAULT_MAX_DIMENSION: u32 = 512;

/// Default JPEG quality for the re-encoded copy.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Preprocessing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessOptions {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// A bounded, re-encoded copy of an image.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PreparedImage {
    pub const MIME_TYPE: &'static str = "image/jpeg";

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// `data:` URL accepted by chat-completions image inputs.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", Self::MIME_TYPE, self.to_base64())
    }
}

/// Load an image from disk and produce its bounded copy.
///
/// Decoding and encoding run on the blocking pool.
pub async fn prepare_for_inference(
    path: impl AsRef<Path>,
    options: PreprocessOptions,
) -> MediaResult<PreparedImage> {
    let path = path.as_ref();
    let data = tokio::fs::read(path).await.map_err(|e| {
        MediaError::preprocess(format!("failed to read {}: {}", path.display(), e))
    })?;

    let prepared = tokio::task::spawn_blocking(move || downscale_and_encode(&data, options))
        .await
        .map_err(|e| MediaError::preprocess(format!("preprocess task failed: {}", e)))??;

    debug!(
        path = %path.display(),
        width = prepared.width,
        height = prepared.height,
        bytes = prepared.bytes.len(),
        "Prepared image for inference"
    );
    Ok(prepared)
}

/// Decode `data`, shrink it to fit `options.max_dimension`, and encode as JPEG.
///
/// Images already within bounds are re-encoded without resizing.
pub fn downscale_and_encode(data: &[u8], options: PreprocessOptions) -> MediaResult<PreparedImage> {
    let img = image::load_from_memory(data)
        .map_err(|e| MediaError::preprocess(format!("decode failed: {}", e)))?;

    let bound = options.max_dimension.max(1);
    let (width, height) = img.dimensions();
    let img = if width.max(height) > bound {
        img.resize(bound, bound, FilterType::Triangle)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, options.jpeg_quality.clamp(1, 100))
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| MediaError::preprocess(format!("encode failed: {}", e)))?;

    Ok(PreparedImage {
        bytes,
        width: rgb.width(),
        height: rgb.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, Rgb([200, 40, 40]))
            .save(&path)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_large_image_is_bounded() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "wide.png", 1024, 600);

        let prepared = prepare_for_inference(&path, PreprocessOptions::default())
            .await
            .unwrap();

        assert_eq!((prepared.width, prepared.height), (512, 300));
        let decoded = image::load_from_memory(&prepared.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (512, 300));
    }

    #[tokio::test]
    async fn test_small_image_keeps_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "small.png", 100, 50);

        let prepared = prepare_for_inference(&path, PreprocessOptions::default())
            .await
            .unwrap();

        assert_eq!((prepared.width, prepared.height), (100, 50));
        assert!(prepared.to_data_url().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_undecodable_bytes_fail() {
        let err = downscale_and_encode(b"definitely not an image", PreprocessOptions::default())
            .unwrap_err();
        assert!(matches!(err, MediaError::Preprocess(_)));
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = prepare_for_inference(dir.path().join("nope.jpg"), PreprocessOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Preprocess(_)));
    }
}
