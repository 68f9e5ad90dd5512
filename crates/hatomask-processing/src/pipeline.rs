//! Intake pipeline: validate → read orientation → normalize → re-validate.

use hatomask_core::{AppError, ClientConfig, RawImageFile, SniffedType, UploadValidator};

use crate::image::{read_exif_orientation, ExifOrientation, NormalizedImage, OrientationNormalizer};
use crate::session::SelectionToken;

/// Normalized image plus the metadata the upload needs.
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    pub image: NormalizedImage,
    pub file_name: String,
    /// Size of the file as selected, before normalization.
    pub original_size: u64,
    pub generation: u64,
}

fn sanitize_file_name(file_name: Option<&str>, sniffed: SniffedType) -> String {
    const MAX: usize = 200;
    let extension = sniffed.extension().unwrap_or("bin");

    let stem = file_name
        .map(std::path::Path::new)
        .and_then(|path| path.file_stem())
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.contains(".."))
        .map(|stem| {
            stem.chars()
                .take(MAX)
                .map(|c| {
                    if c.is_alphanumeric() || c == '-' || c == '_' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect::<String>()
        })
        .filter(|stem| !stem.trim_matches('_').is_empty())
        .unwrap_or_else(|| "photo".to_string());

    format!("{}.{}", stem, extension)
}

/// Turns a selected file into an upright upload candidate.
#[derive(Debug, Clone, Default)]
pub struct IntakePipeline {
    validator: UploadValidator,
    normalizer: OrientationNormalizer,
}

impl IntakePipeline {
    pub fn new(validator: UploadValidator, normalizer: OrientationNormalizer) -> Self {
        Self {
            validator,
            normalizer,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            UploadValidator::new(config.max_upload_bytes),
            OrientationNormalizer::from_config(config),
        )
    }

    pub fn validator(&self) -> &UploadValidator {
        &self.validator
    }

    pub fn normalizer(&self) -> &OrientationNormalizer {
        &self.normalizer
    }

    /// Run the intake for one selection.
    ///
    /// Rejected files never reach the decoder. Decoding and re-encoding run on
    /// the blocking pool. Fails with [`AppError::Superseded`] if `token` is no
    /// longer current when the work finishes.
    pub async fn prepare(
        &self,
        raw: RawImageFile,
        token: &SelectionToken,
    ) -> Result<PreparedUpload, AppError> {
        token.ensure_current()?;

        let sniffed = self.validator.validate(&raw)?;
        let orientation = match sniffed {
            SniffedType::Jpeg => read_exif_orientation(&raw.bytes),
            _ => ExifOrientation::Normal,
        };

        tracing::info!(
            generation = token.generation(),
            sniffed = %sniffed,
            size = raw.effective_size(),
            orientation = orientation.code(),
            "Preparing photo"
        );

        let original_size = raw.effective_size();
        let file_name = sanitize_file_name(raw.file_name.as_deref(), sniffed);
        let normalizer = self.normalizer;
        let bytes = raw.bytes;

        // Image decode is CPU-bound; run off the async pool to avoid blocking other tasks.
        let normalized =
            tokio::task::spawn_blocking(move || normalizer.normalize(bytes, sniffed, orientation))
                .await
                .map_err(|e| AppError::Normalization(format!("Normalization task failed: {}", e)))?;
        let image = normalized?;

        // Re-encoding may grow the file past the limit.
        self.validator.validate_bytes(&image.bytes)?;

        token.ensure_current()?;

        let file_name = if image.sniffed_type == sniffed {
            file_name
        } else {
            sanitize_file_name(Some(&file_name), image.sniffed_type)
        };

        tracing::debug!(
            generation = token.generation(),
            width = image.dimensions.width,
            height = image.dimensions.height,
            size = image.len(),
            reencoded = image.reencoded,
            "Photo prepared"
        );

        Ok(PreparedUpload {
            image,
            file_name,
            original_size,
            generation: token.generation(),
        })
    }
}
