//! HTTP client for the HatoMask photo service.
//!
//! Provides a minimal client with generic GET/POST helpers that model every
//! response as an [`ApiOutcome`], plus domain methods (upload, face detection,
//! health check). The CLI uses this client directly.

pub mod api;

pub use api::HelloResponse;

use hatomask_core::constants::API_PREFIX;
use hatomask_core::{ApiOutcome, AppError, ClientConfig, Endpoint, ProblemDetails, UploadValidator};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Versioned API path, e.g. `api_path("/photos")` → `/api/v1/photos`.
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

/// HTTP client for the photo service.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    validator: UploadValidator,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        validator: UploadValidator,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            validator,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, AppError> {
        Self::new(
            config.api_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
            UploadValidator::new(config.max_upload_bytes),
        )
    }

    /// Create client from environment: HATOMASK_API_URL (or API_URL) and the
    /// other `HATOMASK_*` settings.
    pub fn from_env() -> Result<Self, AppError> {
        let config = ClientConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?;
        Self::from_config(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn validator(&self) -> &UploadValidator {
        &self.validator
    }

    /// Send a request and classify the response. Only transport failures and
    /// undecodable success bodies are errors here.
    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<ApiOutcome<T>, AppError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(endpoint = %endpoint, error = %e, "Failed to send request");
            AppError::Transport {
                endpoint,
                message: format!("Failed to send request: {}", e),
            }
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| AppError::Transport {
            endpoint,
            message: format!("Failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            let problem = ProblemDetails::from_body(&body);
            tracing::warn!(
                endpoint = %endpoint,
                status = status.as_u16(),
                detail = problem.as_ref().and_then(|p| p.detail()).unwrap_or(""),
                "API request failed"
            );
            return Ok(ApiOutcome::Failure {
                status: status.as_u16(),
                problem,
            });
        }

        let payload = serde_json::from_slice(&body).map_err(|e| AppError::Transport {
            endpoint,
            message: format!("Failed to parse response as JSON: {}", e),
        })?;

        tracing::debug!(endpoint = %endpoint, status = status.as_u16(), "API request succeeded");
        Ok(ApiOutcome::Success(payload))
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        path: &str,
    ) -> Result<T, AppError> {
        let url = self.build_url(path);
        self.send(endpoint, self.client.get(&url))
            .await?
            .into_result(endpoint)
    }

    /// POST without a body and deserialize response.
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        path: &str,
    ) -> Result<T, AppError> {
        let url = self.build_url(path);
        self.send(endpoint, self.client.post(&url))
            .await?
            .into_result(endpoint)
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, AppError> {
        let url = self.build_url(path);
        self.send(endpoint, self.client.post(&url).multipart(form))
            .await?
            .into_result(endpoint)
    }
}
