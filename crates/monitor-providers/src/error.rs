//! Error taxonomy shared by all provider clients.

use monitor_core::error::MonitorError;
use reqwest::StatusCode;

/// Failure of a single provider request.
///
/// The inner string carries provider-internal detail for logs. Rendered
/// output uses [`ProviderError::cause`] instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl ProviderError {
    /// Curated, fixed cause string safe to show to end users.
    pub fn cause(&self) -> &'static str {
        match self {
            ProviderError::Auth(_) => "authentication failed",
            ProviderError::NotFound(_) => "user not found",
            ProviderError::Timeout(_) => "request timed out",
            ProviderError::Upstream(_) => "service returned an error",
        }
    }

    /// Classify a non-success HTTP status.
    ///
    /// 410 is what Jira Cloud returns for accounts without product access.
    /// 422 is what GitHub search returns for unknown users.
    pub fn from_status(status: StatusCode, detail: impl Into<String>) -> Self {
        let detail = format!("HTTP {}: {}", status.as_u16(), detail.into());
        match status.as_u16() {
            401 | 403 | 410 => ProviderError::Auth(detail),
            404 | 422 => ProviderError::NotFound(detail),
            408 | 504 => ProviderError::Timeout(detail),
            _ => ProviderError::Upstream(detail),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::from_status(status, err.to_string())
        } else {
            ProviderError::Upstream(err.to_string())
        }
    }
}

impl From<ProviderError> for MonitorError {
    fn from(err: ProviderError) -> Self {
        MonitorError::Api(err.to_string())
    }
}
