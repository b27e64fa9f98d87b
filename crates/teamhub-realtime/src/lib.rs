// Real-time push channel: one WebSocket connection driven by a background task.

pub mod connection;

mod error;

pub use connection::{spawn_realtime, RealtimeCommand, RealtimeConfig, RealtimeNotification};
pub use error::RealtimeError;
