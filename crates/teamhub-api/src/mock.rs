//! In-process HTTP server for endpoint tests.

use std::time::Duration;

use axum::Router;

use crate::ApiClient;

/// Serve `router` on an ephemeral port and return a client pointed at it.
pub(crate) async fn client(router: Router) -> ApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    ApiClient::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap()
}
