//! # teamhub-client
//!
//! The client core that screens sit on: an observable local cache,
//! repositories that pair it with the REST API, offline-first sync, the
//! real-time bridge and per-screen state holders.
//!
//! [`TeamHub`] wires all of it together from a [`ClientConfig`].

pub mod cache;
pub mod config;
pub mod error;
pub mod holders;
pub mod hub;
pub mod logging;
pub mod realtime_bridge;
pub mod repositories;
pub mod session;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheChange, LocalCache};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use holders::UiState;
pub use hub::TeamHub;
pub use sync::{Emission, SyncReport, SyncService};
