use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str =
    "teamhub_client=debug,teamhub_realtime=debug,teamhub_store=info,teamhub_api=info,warn";

/// Install the global `tracing` subscriber. Respects `RUST_LOG`.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
