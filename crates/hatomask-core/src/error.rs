//! Error types module
//!
//! Every stage of the intake chain either yields a value or one of the
//! classified failures below. Parse anomalies in EXIF data are deliberately
//! absent: they resolve to orientation 1 inside the reader and never escape.

use crate::messages::{Locale, UserMessage};
use crate::models::{ProblemDetails, SniffedType};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected failures such as validation
    Debug,
    /// Recoverable issues such as an upstream 5xx
    Warn,
    /// Unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "FILE_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Whether the user action can simply be retried
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// Message shown to the user
    fn user_message(&self, locale: Locale) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Remote endpoint a request was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Upload,
    Detection,
    Health,
}

impl Endpoint {
    fn fallback_message(&self) -> UserMessage {
        match self {
            Endpoint::Upload => UserMessage::UploadFailed,
            Endpoint::Detection => UserMessage::DetectionFailed,
            Endpoint::Health => UserMessage::ConnectionFailed,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Upload => write!(f, "upload"),
            Endpoint::Detection => write!(f, "detection"),
            Endpoint::Health => write!(f, "health"),
        }
    }
}

/// Rejections raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Empty file")]
    EmptyFile,

    #[error("Unsupported file type: sniffed {sniffed} (declared: {declared:?})")]
    UnsupportedType {
        sniffed: SniffedType,
        declared: Option<String>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Image normalization failed: {0}")]
    Normalization(String),

    #[error("{endpoint} request failed with status {status}")]
    Upstream {
        endpoint: Endpoint,
        status: u16,
        problem: Option<ProblemDetails>,
    },

    #[error("{endpoint} request could not be completed: {message}")]
    Transport { endpoint: Endpoint, message: String },

    #[error("Invalid detection result: {0}")]
    InvalidDetection(String),

    #[error("Selection {stale} was superseded by selection {current}")]
    Superseded { stale: u64, current: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error: {message}")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::Validation(ValidationError::FileTooLarge { .. }) => (
            "FILE_TOO_LARGE",
            false,
            Some("Choose a smaller file"),
            LogLevel::Debug,
        ),
        AppError::Validation(ValidationError::EmptyFile) => (
            "EMPTY_FILE",
            false,
            Some("Choose a different file"),
            LogLevel::Debug,
        ),
        AppError::Validation(ValidationError::UnsupportedType { .. }) => (
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Choose a JPEG or PNG file"),
            LogLevel::Debug,
        ),
        AppError::Normalization(_) => (
            "NORMALIZATION_FAILED",
            true,
            Some("Retry, or choose a different file"),
            LogLevel::Warn,
        ),
        AppError::Upstream { status, .. } if *status >= 500 => (
            "UPSTREAM_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        AppError::Upstream { .. } => (
            "UPSTREAM_REJECTED",
            true,
            Some("Check the file and retry"),
            LogLevel::Warn,
        ),
        AppError::Transport { .. } => (
            "TRANSPORT_ERROR",
            true,
            Some("Check the connection and retry"),
            LogLevel::Warn,
        ),
        AppError::InvalidDetection(_) => (
            "INVALID_DETECTION",
            true,
            Some("Retry face detection"),
            LogLevel::Warn,
        ),
        AppError::Superseded { .. } => ("SUPERSEDED", false, None, LogLevel::Debug),
        AppError::Config(_) => (
            "CONFIG_ERROR",
            false,
            Some("Check HATOMASK_* environment variables"),
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }

    /// Emit this error through `tracing` at its metadata log level.
    pub fn log(&self) {
        let code = self.error_code();
        match self.log_level() {
            LogLevel::Debug => tracing::debug!(error_code = code, error = %self, "Intake step failed"),
            LogLevel::Warn => tracing::warn!(error_code = code, error = %self, "Intake step failed"),
            LogLevel::Error => {
                tracing::error!(error_code = code, error = %self.detailed_message(), "Intake step failed")
            }
        }
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn user_message(&self, locale: Locale) -> String {
        match self {
            AppError::Validation(ValidationError::FileTooLarge { .. }) => {
                UserMessage::FileTooLarge.text(locale).to_string()
            }
            AppError::Validation(ValidationError::EmptyFile) => {
                UserMessage::EmptyFile.text(locale).to_string()
            }
            AppError::Validation(ValidationError::UnsupportedType { .. }) => {
                UserMessage::UnsupportedType.text(locale).to_string()
            }
            AppError::Normalization(_) => UserMessage::NormalizationFailed.text(locale).to_string(),
            AppError::Upstream {
                endpoint, problem, ..
            } => problem
                .as_ref()
                .and_then(|p| p.detail())
                .map(str::to_string)
                .unwrap_or_else(|| endpoint.fallback_message().text(locale).to_string()),
            AppError::Transport { endpoint, .. } => {
                endpoint.fallback_message().text(locale).to_string()
            }
            AppError::InvalidDetection(_) => UserMessage::DetectionFailed.text(locale).to_string(),
            AppError::Superseded { .. } => String::new(),
            AppError::Config(ref msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                UserMessage::NormalizationFailed.text(locale).to_string()
            }
        }
    }
}
