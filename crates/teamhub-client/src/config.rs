//! Client configuration loaded from environment variables.
//!
//! Every setting has a default that points at a local development backend,
//! so the client starts with zero configuration.

use std::path::PathBuf;
use std::time::Duration;

use teamhub_shared::constants::{
    DEFAULT_API_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PAGE_SIZE, DEFAULT_PING_INTERVAL_SECS,
    DEFAULT_WS_URL, MAX_PAGE_SIZE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST API base URL.
    /// Env: `TEAMHUB_API_URL`
    pub api_url: String,

    /// Real-time WebSocket endpoint.
    /// Env: `TEAMHUB_WS_URL`
    pub ws_url: String,

    /// Database file. `None` uses the platform data directory.
    /// Env: `TEAMHUB_DB_PATH`
    pub db_path: Option<PathBuf>,

    /// Items requested per page for messages and notifications.
    /// Env: `TEAMHUB_PAGE_SIZE` (1..=200)
    pub page_size: u32,

    /// Env: `TEAMHUB_HTTP_TIMEOUT_SECS`
    pub http_timeout: Duration,

    /// Env: `TEAMHUB_PING_INTERVAL_SECS`
    pub ping_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            db_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            ping_interval: Duration::from_secs(DEFAULT_PING_INTERVAL_SECS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = non_empty(lookup("TEAMHUB_API_URL")) {
            config.api_url = url;
        }

        if let Some(url) = non_empty(lookup("TEAMHUB_WS_URL")) {
            config.ws_url = url;
        }

        if let Some(path) = non_empty(lookup("TEAMHUB_DB_PATH")) {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(val) = lookup("TEAMHUB_PAGE_SIZE") {
            match val.trim().parse::<u32>() {
                Ok(n) if (1..=MAX_PAGE_SIZE).contains(&n) => config.page_size = n,
                _ => tracing::warn!(value = %val, "Invalid TEAMHUB_PAGE_SIZE, using default"),
            }
        }

        if let Some(val) = lookup("TEAMHUB_HTTP_TIMEOUT_SECS") {
            match parse_secs(&val) {
                Some(d) => config.http_timeout = d,
                None => tracing::warn!(value = %val, "Invalid TEAMHUB_HTTP_TIMEOUT_SECS, using default"),
            }
        }

        if let Some(val) = lookup("TEAMHUB_PING_INTERVAL_SECS") {
            match parse_secs(&val) {
                Some(d) => config.ping_interval = d,
                None => tracing::warn!(value = %val, "Invalid TEAMHUB_PING_INTERVAL_SECS, using default"),
            }
        }

        config
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// A positive whole number of seconds.
fn parse_secs(value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(Duration::from_secs(n)),
    }
}
