//! Helpers for tests that need a backend: an axum router served on an
//! ephemeral port and an in-memory cache.

use std::time::Duration;

use axum::Router;
use teamhub_api::ApiClient;

use crate::cache::LocalCache;

pub(crate) async fn serve(router: Router) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

pub(crate) async fn api_and_cache(router: Router) -> (ApiClient, LocalCache) {
    let addr = serve(router).await;
    let api = ApiClient::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
    (api, LocalCache::open_in_memory().unwrap())
}

/// An API client pointed at a port nothing listens on.
pub(crate) fn offline_api() -> ApiClient {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    ApiClient::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap()
}
