use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Session expired")]
    SessionExpired,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Too many requests")]
    RateLimited { retry_after: Option<u64> },

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Stream error: {0}")]
    Stream(String),
}

impl ApiError {
    /// Build an error from a non-success HTTP status and the response body.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ApiError::BadRequest(message),
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited { retry_after: None },
            _ => ApiError::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// The HTTP status this error corresponds to, when it has one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest(_) => Some(400),
            ApiError::Unauthorized | ApiError::SessionExpired | ApiError::InvalidToken(_) => {
                Some(401)
            }
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::RateLimited { .. } => Some(429),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether a failed request may be retried.
    ///
    /// Retryable: 408, 413, 429 and 5xx, plus transport-level failures
    /// (timeouts, refused connections). Other 4xx are permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::RateLimited { .. } => true,
            ApiError::Status { status, .. } => {
                matches!(status, 408 | 413) || (500..=599).contains(status)
            }
            ApiError::Network(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
