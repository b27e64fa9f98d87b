/// Application name
pub const APP_NAME: &str = "TeamHub";

/// Default REST API base URL (local development backend)
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Default real-time endpoint
pub const DEFAULT_WS_URL: &str = "ws://localhost:8080/ws";

/// Items requested per page for paged endpoints
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Upper bound accepted for a configured page size
pub const MAX_PAGE_SIZE: u32 = 200;

/// HTTP request timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Real-time keep-alive ping interval in seconds
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 25;

/// Capacity of the real-time command/notification channels
pub const REALTIME_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the cache change broadcast
pub const CACHE_CHANGE_CAPACITY: usize = 1024;
