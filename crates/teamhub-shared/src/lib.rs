//! # teamhub-shared
//!
//! Types shared by every TeamHub crate: the entity model mirrored from the
//! backend, request bodies for the REST API, and the real-time push
//! protocol.

pub mod constants;
pub mod error;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod models;
pub mod protocol;
pub mod requests;
pub mod types;

pub use error::{ParseEnumError, ProtocolError};
pub use models::*;
pub use types::*;
