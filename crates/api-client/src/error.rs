//! Error types for the API client crate.

use thiserror::Error;

use doorstep_core::sync::RetryClass;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur while talking to the campaign API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: no usable HTTP response.
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response arrived but its payload could not be decoded.
    #[error("Decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// 401: the session is missing or expired.
    #[error("Unauthorized - please sign in again")]
    Unauthorized,

    /// 403: the account lacks permission for this resource.
    #[error("Forbidden - you don't have permission")]
    Forbidden,

    /// 404
    #[error("Resource not found")]
    NotFound,

    /// 400/422: the server rejected the payload. Carries the raw body so
    /// callers can surface the server's validation detail.
    #[error("Validation error ({status}): {body}")]
    Validation { status: u16, body: String },

    /// 5xx
    #[error("Server error ({0})")]
    Server(u16),

    /// Any other non-success response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Request could not be built (bad token bytes, etc.).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// HTTP status if the server produced a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Validation { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Server(status) => Some(*status),
            Self::Unauthorized => Some(401),
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            _ => None,
        }
    }

    /// Classify this error for the sync engine's retry policy.
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Http(_) => RetryClass::Retryable,
            Self::Server(_) => RetryClass::Retryable,
            Self::Unauthorized | Self::Forbidden => RetryClass::ReauthRequired,
            Self::Api { status, .. } => doorstep_core::sync::classify_http_status(*status),
            Self::Json(_) | Self::NotFound | Self::Validation { .. } | Self::InvalidRequest(_) => {
                RetryClass::Permanent
            }
        }
    }
}
