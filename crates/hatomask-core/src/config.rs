//! Configuration module
//!
//! Client configuration read from `HATOMASK_*` environment variables.

use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_JPEG_QUALITY, DEFAULT_REQUEST_TIMEOUT_SECS, MAX_UPLOAD_BYTES,
};
use crate::messages::Locale;

/// Configuration for the intake pipeline and the photo service client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub max_upload_bytes: u64,
    /// Quality factor in (0, 1] used when an oriented image is re-encoded.
    pub jpeg_quality: f32,
    pub request_timeout_secs: u64,
    pub locale: Locale,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            max_upload_bytes: MAX_UPLOAD_BYTES as u64,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            locale: Locale::default(),
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {}: {} ({})", name, raw, e)),
        _ => Ok(default),
    }
}

impl ClientConfig {
    /// Read configuration from the environment (loading `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let api_url = env::var("HATOMASK_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or(defaults.api_url);

        let config = Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            max_upload_bytes: parse_var("HATOMASK_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            jpeg_quality: parse_var("HATOMASK_JPEG_QUALITY", defaults.jpeg_quality)?,
            request_timeout_secs: parse_var(
                "HATOMASK_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            locale: parse_var("HATOMASK_LOCALE", defaults.locale)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.api_url.trim().is_empty() {
            anyhow::bail!("HATOMASK_API_URL must not be empty");
        }
        if self.max_upload_bytes == 0 {
            anyhow::bail!("HATOMASK_MAX_UPLOAD_BYTES must be greater than 0");
        }
        if !(self.jpeg_quality > 0.0 && self.jpeg_quality <= 1.0) {
            anyhow::bail!(
                "HATOMASK_JPEG_QUALITY must be in (0, 1], got {}",
                self.jpeg_quality
            );
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("HATOMASK_REQUEST_TIMEOUT_SECS must be greater than 0");
        }
        Ok(())
    }

    /// JPEG encoder quality as a percentage (1..=100).
    pub fn jpeg_quality_percent(&self) -> u8 {
        (self.jpeg_quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_upload_bytes, 10_485_760);
        assert_eq!(config.jpeg_quality_percent(), 92);
        assert_eq!(config.locale, Locale::En);
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        let config = ClientConfig {
            jpeg_quality: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            jpeg_quality: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = ClientConfig {
            max_upload_bytes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let value: u64 = parse_var("HATOMASK_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
