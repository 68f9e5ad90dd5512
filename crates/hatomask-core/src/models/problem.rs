use serde::{Deserialize, Serialize};

use crate::error::{AppError, Endpoint};

/// Structured error payload returned by the photo service (RFC 7807 shape).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub problem_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProblemDetails {
    /// Parse an error body. Returns `None` when the body is not a problem object.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        let problem: ProblemDetails = serde_json::from_slice(body).ok()?;
        if problem == ProblemDetails::default() {
            return None;
        }
        Some(problem)
    }

    /// The user-facing detail, if the service sent a non-blank one.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref().filter(|d| !d.trim().is_empty())
    }
}

/// Outcome of one call to a remote endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Success(T),
    Failure {
        status: u16,
        problem: Option<ProblemDetails>,
    },
}

impl<T> ApiOutcome<T> {
    pub fn into_result(self, endpoint: Endpoint) -> Result<T, AppError> {
        match self {
            ApiOutcome::Success(payload) => Ok(payload),
            ApiOutcome::Failure { status, problem } => Err(AppError::Upstream {
                endpoint,
                status,
                problem,
            }),
        }
    }
}
