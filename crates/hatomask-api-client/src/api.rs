//! Domain methods for the photo service client.
//!
//! Response types come from `hatomask_core::models`; only the health check
//! payload is defined here.

use crate::{api_path, ApiClient};
use bytes::Bytes;
use hatomask_core::constants::UPLOAD_FIELD_NAME;
use hatomask_core::{
    AppError, Endpoint, FaceDetectionResponse, FaceDetectionResult, PhotoUploadResponse,
};
use hatomask_processing::PreparedUpload;
use reqwest::multipart::{Form, Part};
use uuid::Uuid;

/// Body of `GET /hello`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HelloResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiClient {
    /// Upload a prepared (upright) photo.
    pub async fn upload_photo(
        &self,
        upload: &PreparedUpload,
    ) -> Result<PhotoUploadResponse, AppError> {
        self.upload_bytes(upload.image.bytes.clone(), &upload.file_name)
            .await
    }

    /// Upload raw image bytes as the `file` multipart part.
    ///
    /// The bytes are checked against the size limit and their magic bytes
    /// before anything is sent.
    pub async fn upload_bytes(
        &self,
        data: Bytes,
        file_name: &str,
    ) -> Result<PhotoUploadResponse, AppError> {
        let sniffed = self.validator.validate_bytes(&data)?;
        let mime_type = sniffed.mime_type().unwrap_or("application/octet-stream");
        let size = data.len();

        let part = Part::bytes(data.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| AppError::Internal(format!("Invalid MIME type {}: {}", mime_type, e)))?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        tracing::info!(file_name, size, mime_type, "Uploading photo");

        let response: PhotoUploadResponse = self
            .post_multipart(Endpoint::Upload, &api_path("/photos"), form)
            .await?;

        tracing::info!(
            photo_id = %response.photo_id,
            width = response.dimensions.width,
            height = response.dimensions.height,
            "Photo uploaded"
        );
        Ok(response)
    }

    /// Run face detection on an uploaded photo.
    ///
    /// The result is validated once here; every coordinate is a fraction of
    /// the upright image afterwards.
    pub async fn detect_faces(&self, photo_id: Uuid) -> Result<FaceDetectionResult, AppError> {
        let path = api_path(&format!("/photos/{}/face-detections", photo_id));
        let response: FaceDetectionResponse =
            self.post_empty(Endpoint::Detection, &path).await?;

        response.result.validate()?;
        tracing::info!(
            photo_id = %photo_id,
            landmarks = response.result.landmarks.len(),
            confidence = ?response.result.confidence,
            "Face detection completed"
        );
        Ok(response.result)
    }

    /// Connection check against `GET /hello`.
    pub async fn health(&self) -> Result<HelloResponse, AppError> {
        self.get(Endpoint::Health, &api_path("/hello")).await
    }
}
