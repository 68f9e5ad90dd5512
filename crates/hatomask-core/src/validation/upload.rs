use crate::constants::MAX_UPLOAD_BYTES;
use crate::error::ValidationError;
use crate::models::{RawImageFile, SniffedType};

use super::magic::sniff;

/// Upload file validator
///
/// Gates a file on size and on its sniffed type. The declared content type is
/// only compared against the sniffed type for logging; it never decides.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: u64,
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new(MAX_UPLOAD_BYTES as u64)
    }
}

impl UploadValidator {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate the sniffed type
    pub fn validate_type(
        &self,
        sniffed: SniffedType,
        declared: Option<&str>,
    ) -> Result<(), ValidationError> {
        if !sniffed.is_supported() {
            return Err(ValidationError::UnsupportedType {
                sniffed,
                declared: declared.map(str::to_string),
            });
        }

        if let Some(label) = declared {
            let claimed = SniffedType::from_mime_type(label);
            if claimed != sniffed {
                tracing::warn!(
                    declared = %label,
                    sniffed = %sniffed,
                    "Declared content type does not match file contents, using sniffed type"
                );
            }
        }

        Ok(())
    }

    /// Validate bytes about to be sent: size first, then magic bytes.
    pub fn validate_bytes(&self, data: &[u8]) -> Result<SniffedType, ValidationError> {
        self.validate_file_size(data.len() as u64)?;
        let sniffed = sniff(data);
        self.validate_type(sniffed, None)?;
        Ok(sniffed)
    }

    /// Validate a selected file and return its sniffed type.
    pub fn validate(&self, file: &RawImageFile) -> Result<SniffedType, ValidationError> {
        self.validate_file_size(file.effective_size())?;
        let sniffed = sniff(&file.bytes);
        self.validate_type(sniffed, file.declared_content_type.as_deref())?;
        Ok(sniffed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG_HEAD: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];
    const PNG_HEAD: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_validate_file_size_ok() {
        let validator = UploadValidator::default();
        assert!(validator.validate_file_size(512 * 1024).is_ok());
        assert!(validator.validate_file_size(10 * 1024 * 1024).is_ok());
    }

    #[test]
    fn test_validate_file_size_too_large() {
        let validator = UploadValidator::default();
        assert_eq!(
            validator.validate_file_size(10 * 1024 * 1024 + 1),
            Err(ValidationError::FileTooLarge {
                size: 10 * 1024 * 1024 + 1,
                max: 10 * 1024 * 1024,
            })
        );
    }

    #[test]
    fn test_validate_file_size_empty() {
        let validator = UploadValidator::default();
        assert!(matches!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        ));
    }

    #[test]
    fn test_validate_accepts_jpeg_and_png() {
        let validator = UploadValidator::default();
        let jpeg = RawImageFile::new(JPEG_HEAD.to_vec()).with_content_type("image/jpeg");
        assert_eq!(validator.validate(&jpeg), Ok(SniffedType::Jpeg));

        let png = RawImageFile::new(PNG_HEAD.to_vec()).with_content_type("image/png");
        assert_eq!(validator.validate(&png), Ok(SniffedType::Png));
    }

    #[test]
    fn test_spoofed_label_is_ignored() {
        let validator = UploadValidator::default();
        let spoofed = RawImageFile::new(b"GIF89a....".to_vec()).with_content_type("image/jpeg");
        assert!(matches!(
            validator.validate(&spoofed),
            Err(ValidationError::UnsupportedType {
                sniffed: SniffedType::Unknown,
                ..
            })
        ));
    }

    #[test]
    fn test_mislabeled_but_valid_file_passes_with_sniffed_type() {
        let validator = UploadValidator::default();
        let mislabeled = RawImageFile::new(PNG_HEAD.to_vec()).with_content_type("image/gif");
        assert_eq!(validator.validate(&mislabeled), Ok(SniffedType::Png));
    }

    #[test]
    fn test_oversized_file_rejected_regardless_of_label() {
        let validator = UploadValidator::default();
        let mut data = vec![0u8; 11 * 1024 * 1024];
        data[..4].copy_from_slice(&JPEG_HEAD);
        let file = RawImageFile::new(data).with_content_type("image/jpeg");
        assert!(matches!(
            validator.validate(&file),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_declared_size_counts() {
        let validator = UploadValidator::default();
        let file = RawImageFile::new(JPEG_HEAD.to_vec()).with_declared_size(11 * 1024 * 1024);
        assert!(matches!(
            validator.validate(&file),
            Err(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_bytes() {
        let validator = UploadValidator::new(16);
        assert_eq!(validator.validate_bytes(&JPEG_HEAD), Ok(SniffedType::Jpeg));
        assert!(validator.validate_bytes(&[0u8; 17]).is_err());
        assert!(validator.validate_bytes(b"text").is_err());
    }
}
