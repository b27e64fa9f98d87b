use thiserror::Error;

use teamhub_api::ApiError;
use teamhub_realtime::RealtimeError;
use teamhub_store::StoreError;

/// Errors surfaced by repositories, sync and state holders.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Real-time error: {0}")]
    Realtime(#[from] RealtimeError),

    /// A thread panicked while holding the cache lock.
    #[error("Cache lock poisoned")]
    LockPoisoned,

    /// The operation needs a signed-in account.
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// A message fit for display on screen.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api(ApiError::Network(_)) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ClientError::Api(ApiError::Unauthorized) | ClientError::NotAuthenticated => {
                "Your session has expired. Please sign in again.".to_string()
            }
            ClientError::Api(ApiError::NotFound(_)) | ClientError::Store(StoreError::NotFound) => {
                "This item no longer exists.".to_string()
            }
            ClientError::Api(ApiError::Status { message, .. }) => message.clone(),
            ClientError::Api(ApiError::Decode(_)) => {
                "The server sent an unexpected response.".to_string()
            }
            ClientError::Store(StoreError::Constraint(_)) => {
                "That email or phone number is already in use.".to_string()
            }
            ClientError::Realtime(_) => "Live updates are unavailable right now.".to_string(),
            other => format!("Something went wrong: {other}"),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ClientError::Api(ApiError::Unauthorized) | ClientError::NotAuthenticated
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
