//! `/auth` and `/otp` endpoints.
//!
//! None of these methods store the returned token; callers decide when to
//! call [`ApiClient::set_token`].

use teamhub_shared::requests::{
    LoginRequest, OtpSendRequest, OtpVerifyRequest, RefreshRequest, RegisterRequest,
};
use teamhub_shared::AuthSession;

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/login", &body).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession> {
        self.post("/auth/register", request).await
    }

    /// Exchange a refresh token for a new session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.post("/auth/refresh", &body).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.post_unit("/auth/logout", &serde_json::json!({})).await
    }

    /// Ask the backend to deliver a one-time code to an email or phone number.
    pub async fn send_otp(&self, target: &str) -> Result<()> {
        let body = OtpSendRequest {
            target: target.to_string(),
        };
        self.post_unit("/otp/send", &body).await
    }

    pub async fn verify_otp(&self, target: &str, code: &str) -> Result<AuthSession> {
        let body = OtpVerifyRequest {
            target: target.to_string(),
            code: code.to_string(),
        };
        self.post("/otp/verify", &body).await
    }
}
