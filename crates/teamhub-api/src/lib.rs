//! # teamhub-api
//!
//! Typed declarations of the TeamHub REST endpoints over `reqwest`.
//!
//! [`ApiClient`] holds the HTTP client, the base URL and the bearer token.
//! Each resource module adds its endpoints as `impl ApiClient` methods, so
//! callers see one flat client: `api.list_workspaces()`,
//! `api.messages_page(channel_id, page)`, ...

pub mod auth;
pub mod bugs;
pub mod channels;
pub mod client;
pub mod epics;
pub mod invitations;
pub mod messages;
pub mod notifications;
pub mod reports;
pub mod sprints;
pub mod tasks;
pub mod users;
pub mod workspaces;

mod error;

#[cfg(test)]
pub(crate) mod mock;

pub use client::ApiClient;
pub use error::{ApiError, Result};
