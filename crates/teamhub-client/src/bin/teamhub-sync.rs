//! # teamhub-sync
//!
//! Headless client: pulls every workspace into the local cache, then keeps
//! it current from the real-time channel until Ctrl+C.
//!
//! Signs in with the session cached by a previous run, or with the access
//! token in `TEAMHUB_TOKEN`.

use anyhow::Context;
use tracing::{error, info, warn};

use teamhub_client::logging::init_tracing;
use teamhub_client::realtime_bridge::RealtimeBridge;
use teamhub_client::{ClientConfig, TeamHub};
use teamhub_realtime::RealtimeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Logging and configuration
    // -----------------------------------------------------------------------
    init_tracing();
    info!("Starting teamhub-sync v{}", env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 2. Open the cache and sign in
    // -----------------------------------------------------------------------
    let hub = TeamHub::open(config).context("opening local cache")?;

    let token = match hub.session.restore_session()? {
        Some(session) => {
            info!(user = %session.user.id, email = %session.user.email, "Using cached session");
            session.account.access_token
        }
        None => {
            let token = std::env::var("TEAMHUB_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty())
                .context("no cached session; set TEAMHUB_TOKEN")?;
            hub.api.set_token(Some(token.clone()));
            info!("Using access token from TEAMHUB_TOKEN");
            token
        }
    };

    // -----------------------------------------------------------------------
    // 3. Pull everything
    // -----------------------------------------------------------------------
    let report = hub.sync.sync_all().await;
    for (scope, reason) in report.failures() {
        warn!(scope = %scope, reason = %reason, "Sync step failed");
    }
    info!(
        steps = report.steps.len(),
        upserted = report.upserted(),
        clean = report.is_clean(),
        "Initial sync finished"
    );

    // -----------------------------------------------------------------------
    // 4. Follow the real-time channel until Ctrl+C or disconnect
    // -----------------------------------------------------------------------
    let mut rt_config = RealtimeConfig::new(&hub.config.ws_url, Some(token));
    rt_config.ping_interval = hub.config.ping_interval;
    let mut bridge = RealtimeBridge::start(rt_config, hub.cache.clone())
        .await
        .context("connecting real-time channel")?;

    tokio::select! {
        _ = bridge.closed() => {
            error!("Real-time channel closed");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    bridge.shutdown().await;
    info!("teamhub-sync stopped");
    Ok(())
}
