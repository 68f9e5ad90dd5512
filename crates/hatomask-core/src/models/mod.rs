//! Data models for the application
//!
//! Intake types (raw files, sniffed types, dimensions) and the wire shapes of
//! the upload and face-detection endpoints.

mod detection;
mod image;
mod problem;
mod upload;

pub use detection::*;
pub use image::*;
pub use problem::*;
pub use upload::*;
