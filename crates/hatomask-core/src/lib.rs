//! HatoMask Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration and
//! upload validation shared by the intake pipeline, the API client and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod messages;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{AppError, Endpoint, ErrorMetadata, LogLevel, ValidationError};
pub use messages::{Locale, UserMessage};
pub use models::{
    ApiOutcome, DetectionBox, DetectionPoint, FaceDetectionResponse, FaceDetectionResult,
    FaceLandmark, ImageDimensions, PhotoUploadResponse, ProblemDetails, RawImageFile, SniffedType,
};
pub use validation::{sniff, UploadValidator};
