use thiserror::Error;

/// Errors produced by the REST client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection, TLS or timeout failure before a response arrived.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend rejected the bearer token (HTTP 401).
    #[error("Unauthorized")]
    Unauthorized,

    /// HTTP 404 for the given path.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status, with the server's message.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The body could not be decoded into the expected type.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether the failure happened before the server answered.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;
