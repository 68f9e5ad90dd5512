//! Command implementations for the `hatomask` binary.

use std::path::{Path, PathBuf};

use anyhow::Context;
use hatomask_api_client::ApiClient;
use hatomask_core::{AppError, ImageDimensions, PhotoUploadResponse, RawImageFile, SniffedType};
use hatomask_processing::{
    ContainerBox, ExifOrientation, IntakePipeline, OverlayLayout, PreviewSession, RenderRect,
};
use serde::Serialize;

/// Result of `hatomask process`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessReport {
    pub file_name: String,
    pub sniffed_type: SniffedType,
    pub source_orientation: ExifOrientation,
    pub dimensions: ImageDimensions,
    pub reencoded: bool,
    pub original_size_bytes: u64,
    pub size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Result of `hatomask detect`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub photo: PhotoUploadResponse,
    pub source_orientation: ExifOrientation,
    pub render_rect: RenderRect,
    pub overlay: OverlayLayout,
}

/// Parse a `WIDTHxHEIGHT` container size, e.g. `640x480`.
pub fn parse_container(value: &str) -> Result<ContainerBox, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| format!("invalid container dimension '{}'", part))
    };
    Ok(ContainerBox::new(parse(width)?, parse(height)?))
}

/// Content type a browser would attach based on the file extension. Only a
/// hint; the pipeline decides on magic bytes.
fn content_type_hint(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Read a file from disk as a selected photo.
pub async fn load_photo(path: &Path) -> Result<RawImageFile, AppError> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file {}", path.display()))?;

    let mut raw = RawImageFile::new(data);
    if let Some(content_type) = content_type_hint(path) {
        raw = raw.with_content_type(content_type);
    }
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        raw = raw.with_file_name(name);
    }
    Ok(raw)
}

/// Validate and orient a photo locally, optionally writing the upright image.
pub async fn process_file(
    pipeline: &IntakePipeline,
    path: &Path,
    output: Option<&Path>,
) -> Result<ProcessReport, AppError> {
    let raw = load_photo(path).await?;
    let mut session = PreviewSession::new();
    let token = session.begin_selection();

    let prepared = pipeline.prepare(raw, &token).await?;
    if let Some(output) = output {
        tokio::fs::write(output, &prepared.image.bytes)
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;
        tracing::info!(path = %output.display(), "Wrote upright image");
    }

    let preview = session.commit_preview(&token, prepared.image)?;
    let image = preview.image();
    Ok(ProcessReport {
        file_name: prepared.file_name,
        sniffed_type: image.sniffed_type,
        source_orientation: image.source_orientation,
        dimensions: image.dimensions,
        reencoded: image.reencoded,
        original_size_bytes: prepared.original_size,
        size_bytes: image.len(),
        output: output.map(Path::to_path_buf),
    })
}

/// Full chain for one photo: prepare, upload, detect and map the result into
/// the given container.
pub async fn detect_file(
    client: &ApiClient,
    pipeline: &IntakePipeline,
    path: &Path,
    container: ContainerBox,
) -> Result<DetectionReport, AppError> {
    let raw = load_photo(path).await?;
    let mut session = PreviewSession::new();
    session.resize(container);
    let token = session.begin_selection();

    let prepared = pipeline.prepare(raw, &token).await?;
    let photo = client.upload_photo(&prepared).await?;
    let source_orientation = prepared.image.source_orientation;
    session.commit_preview(&token, prepared.image)?;
    session.commit_upload(&token, photo.clone())?;

    let result = client.detect_faces(photo.photo_id).await?;
    let overlay = session.commit_detection(&token, result)?.ok_or_else(|| {
        AppError::Internal("Render rectangle unavailable for the preview".to_string())
    })?;

    Ok(DetectionReport {
        photo,
        source_orientation,
        render_rect: overlay.render_rect,
        overlay,
    })
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
