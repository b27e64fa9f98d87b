//! HTTP plumbing shared by every endpoint module.

use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};

/// Client for the TeamHub REST API.
///
/// Cheap to clone; clones share the connection pool and the bearer token.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Arc<str>,
    token: Arc<RwLock<Option<String>>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &self.has_token().then_some("<redacted>"))
            .finish()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: Arc::from(base_url),
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace (or clear, with `None`) the bearer token sent on every request.
    pub fn set_token(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    pub fn has_token(&self) -> bool {
        self.current_token().is_some()
    }

    fn current_token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.endpoint(path));
        match self.current_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // -- verbs ---------------------------------------------------------------

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(self.request(Method::GET, path), path).await
    }

    pub(crate) async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send_json(self.request(Method::GET, path).query(query), path)
            .await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(self.request(Method::POST, path).json(body), path)
            .await
    }

    /// POST without a request body, decoding the response.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(self.request(Method::POST, path), path).await
    }

    /// POST whose response body is ignored.
    pub(crate) async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.send_unit(self.request(Method::POST, path).json(body), path)
            .await
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(self.request(Method::PUT, path).json(body), path)
            .await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        self.send_unit(self.request(Method::DELETE, path), path).await
    }

    // -- response handling ---------------------------------------------------

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, path: &str) -> Result<T> {
        let body = self.send(request, path).await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(path, error = %e, "Malformed response body");
            ApiError::Decode(e)
        })
    }

    async fn send_unit(&self, request: RequestBuilder, path: &str) -> Result<()> {
        self.send(request, path).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(path, status = status.as_u16(), "API response");

        if status.is_success() {
            return Ok(body);
        }
        Err(status_error(status, path, &body))
    }
}

fn status_error(status: StatusCode, path: &str, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
        _ => ApiError::Status {
            status: status.as_u16(),
            message: server_message(body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string()),
        },
    }
}

/// Pull the human-readable message out of an error body, if there is one.
fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["message", "error"]
            .iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()))
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}
