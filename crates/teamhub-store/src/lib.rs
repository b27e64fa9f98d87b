//! # teamhub-store
//!
//! Local cache for the TeamHub client, backed by SQLite.
//!
//! One table per entity. The crate exposes a synchronous `Database` handle
//! that wraps a `rusqlite::Connection`, generic cache-replacement helpers
//! driven by the [`Record`] trait, and typed queries for every domain
//! model.

pub mod accounts;
pub mod bugs;
pub mod channels;
pub mod database;
pub mod epics;
pub mod invitations;
pub mod messages;
pub mod migrations;
pub mod notifications;
pub mod record;
pub mod reports;
pub mod sprints;
pub mod sync_state;
pub mod tasks;
pub mod users;
pub mod workspaces;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use record::{Record, ScopeReplace};
pub use sync_state::SyncState;
