//! Upright re-encoding of oriented photos

use bytes::Bytes;
use hatomask_core::constants::DEFAULT_JPEG_QUALITY;
use hatomask_core::{AppError, ClientConfig, ImageDimensions, SniffedType};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageError, ImageFormat, ImageReader};
use std::io::Cursor;
use thiserror::Error;

use super::orientation::{apply_orientation, ExifOrientation};

#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] ImageError),

    #[error("Failed to encode JPEG: {0}")]
    Encode(#[source] ImageError),

    #[error("Image has zero width or height")]
    EmptyImage,

    #[error("Cannot normalize {0} content")]
    Unsupported(SniffedType),
}

impl From<NormalizationError> for AppError {
    fn from(err: NormalizationError) -> Self {
        AppError::Normalization(err.to_string())
    }
}

/// Upright image ready for preview and upload.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub bytes: Bytes,
    pub dimensions: ImageDimensions,
    pub sniffed_type: SniffedType,
    /// Orientation read from the source file.
    pub source_orientation: ExifOrientation,
    /// False when `bytes` are the source bytes, unchanged.
    pub reencoded: bool,
}

impl NormalizedImage {
    pub fn mime_type(&self) -> &'static str {
        self.sniffed_type.mime_type().unwrap_or("application/octet-stream")
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Produces an upright image whose pixel layout matches its visual
/// orientation.
///
/// Orientation 1 passes the source through untouched; any other code decodes,
/// transforms and re-encodes as JPEG.
#[derive(Debug, Clone, Copy)]
pub struct OrientationNormalizer {
    quality: u8,
}

impl Default for OrientationNormalizer {
    fn default() -> Self {
        Self::new((DEFAULT_JPEG_QUALITY * 100.0).round() as u8)
    }
}

impl OrientationNormalizer {
    /// `quality` is the JPEG quality percentage, clamped to 1..=100.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.jpeg_quality_percent())
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn normalize(
        &self,
        source: Bytes,
        sniffed: SniffedType,
        orientation: ExifOrientation,
    ) -> Result<NormalizedImage, NormalizationError> {
        let format = match sniffed {
            SniffedType::Jpeg => ImageFormat::Jpeg,
            SniffedType::Png => ImageFormat::Png,
            SniffedType::Unknown => return Err(NormalizationError::Unsupported(sniffed)),
        };

        if orientation.is_upright() {
            let (width, height) = read_dimensions(&source)?;
            let dimensions =
                ImageDimensions::new(width, height).ok_or(NormalizationError::EmptyImage)?;
            tracing::debug!(
                width,
                height,
                size = source.len(),
                "Image already upright, passing through"
            );
            return Ok(NormalizedImage {
                bytes: source,
                dimensions,
                sniffed_type: sniffed,
                source_orientation: orientation,
                reencoded: false,
            });
        }

        let img = image::load_from_memory_with_format(&source, format)
            .map_err(NormalizationError::Decode)?;
        self.reencode(img, orientation)
    }

    /// Orient a decoded bitmap and encode it as JPEG. Only reached for
    /// orientations other than 1.
    fn reencode(
        &self,
        img: DynamicImage,
        orientation: ExifOrientation,
    ) -> Result<NormalizedImage, NormalizationError> {
        let upright = apply_orientation(img, orientation);
        let rgb = upright.to_rgb8();
        let (width, height) = rgb.dimensions();
        let dimensions =
            ImageDimensions::new(width, height).ok_or(NormalizationError::EmptyImage)?;

        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, self.quality)
            .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(NormalizationError::Encode)?;

        tracing::debug!(
            orientation = orientation.code(),
            width,
            height,
            quality = self.quality,
            size = buffer.len(),
            "Re-encoded upright image"
        );

        Ok(NormalizedImage {
            bytes: Bytes::from(buffer),
            dimensions,
            sniffed_type: SniffedType::Jpeg,
            source_orientation: orientation,
            reencoded: true,
        })
    }
}

/// Read dimensions from the image header without decoding pixels.
fn read_dimensions(data: &[u8]) -> Result<(u32, u32), NormalizationError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| NormalizationError::Decode(ImageError::IoError(e)))?
        .into_dimensions()
        .map_err(NormalizationError::Decode)
}
