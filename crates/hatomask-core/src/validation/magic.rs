//! Magic-byte file type detection.
//!
//! Classifies content by its leading bytes only. Caller-supplied labels are
//! never consulted here.

use crate::models::SniffedType;

/// JPEG start-of-image marker followed by the first segment marker prefix.
pub const JPEG_SIGNATURE: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// First four bytes of the PNG signature.
pub const PNG_SIGNATURE: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];

/// Classify bytes as JPEG, PNG or unknown.
pub fn sniff(data: &[u8]) -> SniffedType {
    if data.starts_with(&JPEG_SIGNATURE) {
        return SniffedType::Jpeg;
    }
    if data.starts_with(&PNG_SIGNATURE) {
        return SniffedType::Png;
    }
    SniffedType::Unknown
}
