//! The module contains the errors the budgeting service client can return.
use api_types::error::ErrorDetail;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum YnabError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("{status}: {detail}", detail = error.detail)]
    Upstream {
        status: StatusCode,
        error: ErrorDetail,
    },
    /// A success response whose body does not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("OAuth client is not configured")]
    OAuthNotConfigured,
}

impl YnabError {
    pub(crate) fn decode(err: reqwest::Error) -> Self {
        Self::Decode(err.to_string())
    }

    /// Builds an upstream error when the response body is not the usual
    /// error envelope.
    pub(crate) fn from_status(status: StatusCode, detail: Option<String>) -> Self {
        let name = status
            .canonical_reason()
            .unwrap_or("unknown")
            .to_lowercase()
            .replace(' ', "_");
        let detail = detail.unwrap_or_else(|| status.to_string());
        Self::Upstream {
            status,
            error: ErrorDetail {
                id: status.as_u16().to_string(),
                name,
                detail,
            },
        }
    }
}
