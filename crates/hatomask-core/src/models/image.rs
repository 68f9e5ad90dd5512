use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// File type derived from magic bytes.
///
/// Never derived from a caller-supplied label; see [`crate::validation::sniff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SniffedType {
    Jpeg,
    Png,
    Unknown,
}

impl SniffedType {
    /// MIME type for an accepted image type.
    pub fn mime_type(&self) -> Option<&'static str> {
        match self {
            SniffedType::Jpeg => Some("image/jpeg"),
            SniffedType::Png => Some("image/png"),
            SniffedType::Unknown => None,
        }
    }

    /// File extension used when naming multipart parts.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            SniffedType::Jpeg => Some("jpg"),
            SniffedType::Png => Some("png"),
            SniffedType::Unknown => None,
        }
    }

    /// Map a declared MIME label onto the type it claims to be.
    pub fn from_mime_type(content_type: &str) -> SniffedType {
        match content_type.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => SniffedType::Jpeg,
            "image/png" => SniffedType::Png,
            _ => SniffedType::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, SniffedType::Unknown)
    }
}

impl std::fmt::Display for SniffedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SniffedType::Jpeg => write!(f, "jpeg"),
            SniffedType::Png => write!(f, "png"),
            SniffedType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Pixel dimensions of an image. Both sides are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height })
    }
}

/// A file as selected by the user, before any validation.
///
/// The declared size and content type come from the caller and are untrusted.
#[derive(Debug, Clone)]
pub struct RawImageFile {
    pub bytes: Bytes,
    pub declared_size: u64,
    pub declared_content_type: Option<String>,
    pub file_name: Option<String>,
}

impl RawImageFile {
    /// Wrap bytes read from disk; the declared size is the byte length.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            declared_size: bytes.len() as u64,
            bytes,
            declared_content_type: None,
            file_name: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.declared_content_type = Some(content_type.into());
        self
    }

    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.declared_size = size;
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Size used for limit checks: whichever of declared and actual is larger.
    pub fn effective_size(&self) -> u64 {
        self.declared_size.max(self.bytes.len() as u64)
    }
}
