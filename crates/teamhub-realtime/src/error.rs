use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Error, Debug)]
pub enum RealtimeError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("Invalid real-time URL: {0}")]
    InvalidUrl(String),

    #[error("Access token is not a valid header value")]
    InvalidToken,

    /// The connection task has ended.
    #[error("Real-time connection closed")]
    Closed,

    #[error("Protocol error: {0}")]
    Protocol(#[from] teamhub_shared::ProtocolError),
}
