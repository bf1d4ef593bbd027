use alma_models::ValidationError;
use thiserror::Error;

/// Errors that can occur when calling the recommendation service
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request was rejected before anything was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// The call could not complete (DNS, refused connection, timeout)
    #[error("Failed to reach recommendation service: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a status outside 2xx
    #[error("{message} (HTTP {status})")]
    Http {
        status: u16,
        message: String,
        /// Raw body, kept for diagnostics only
        body: Option<String>,
    },

    /// A 2xx body that is not valid JSON or misses required fields
    #[error("Invalid response from recommendation service: {0}")]
    Decode(#[from] serde_json::Error),

    /// A decoded body that breaks the documented invariants
    #[error("Response breaks the service contract: {0}")]
    Contract(ValidationError),
}

impl ApiError {
    /// HTTP status, when the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw error body, when one was returned
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Http { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}
