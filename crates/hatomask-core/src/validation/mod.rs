//! Validation modules

mod magic;
mod upload;

pub use magic::{sniff, JPEG_SIGNATURE, PNG_SIGNATURE};
pub use upload::UploadValidator;
