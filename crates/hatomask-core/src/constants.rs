//! Application-wide constants.

/// Largest file accepted for upload, in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default quality factor used when an oriented image has to be re-encoded.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.92;

/// Default base URL of the photo service.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Path prefix of the photo service API.
pub const API_PREFIX: &str = "/api/v1";

/// Default HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Multipart field name expected by the upload endpoint.
pub const UPLOAD_FIELD_NAME: &str = "file";
