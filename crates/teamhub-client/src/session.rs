//! Sign-in state.
//!
//! A session is the cached [`Account`] (tokens) plus its linked [`User`].
//! Every successful sign-in stores both and installs the access token on
//! the shared [`ApiClient`].

use tracing::{info, warn};

use teamhub_api::ApiClient;
use teamhub_shared::requests::{RegisterRequest, UserUpdate};
use teamhub_shared::{Account, AuthSession, EntityKind, User};

use crate::cache::{CacheChange, LocalCache};
use crate::error::{ClientError, Result};

#[derive(Clone)]
pub struct SessionRepository {
    api: ApiClient,
    cache: LocalCache,
}

impl SessionRepository {
    pub fn new(api: ApiClient, cache: LocalCache) -> Self {
        Self { api, cache }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let session = self.api.login(email, password).await?;
        self.establish(session)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession> {
        let session = self.api.register(request).await?;
        self.establish(session)
    }

    /// Ask for a one-time code; finish with [`SessionRepository::verify_otp`].
    pub async fn send_otp(&self, target: &str) -> Result<()> {
        Ok(self.api.send_otp(target).await?)
    }

    pub async fn verify_otp(&self, target: &str, code: &str) -> Result<AuthSession> {
        let session = self.api.verify_otp(target, code).await?;
        self.establish(session)
    }

    /// Reload the cached session and install its token. `None` when nobody
    /// is signed in on this device.
    pub fn restore_session(&self) -> Result<Option<AuthSession>> {
        let restored = self.cache.read(|db| {
            let account = db.current_account()?;
            let user = db.current_user()?;
            Ok(account.zip(user))
        })?;

        match restored {
            Some((account, user)) => {
                self.api.set_token(Some(account.access_token.clone()));
                info!(user = %user.id, "Session restored");
                Ok(Some(AuthSession { account, user }))
            }
            None => Ok(None),
        }
    }

    /// Trade the cached refresh token for new tokens.
    pub async fn refresh(&self) -> Result<AuthSession> {
        let account = self.current_account()?;
        let refresh_token = account
            .refresh_token
            .as_deref()
            .ok_or(ClientError::NotAuthenticated)?;
        let session = self.api.refresh(refresh_token).await?;
        self.establish(session)
    }

    /// Sign out remotely (best effort) and wipe the cache.
    pub async fn logout(&self) -> Result<()> {
        if self.api.has_token() {
            if let Err(e) = self.api.logout().await {
                warn!(error = %e, "Remote logout failed, clearing local session anyway");
            }
        }
        self.api.set_token(None);
        self.cache.clear()?;
        info!("Signed out");
        Ok(())
    }

    pub fn current_account(&self) -> Result<Account> {
        self.cache
            .read(|db| db.current_account())?
            .ok_or(ClientError::NotAuthenticated)
    }

    /// The signed-in user's cached profile.
    pub fn current_user(&self) -> Result<User> {
        self.cache
            .read(|db| db.current_user())?
            .ok_or(ClientError::NotAuthenticated)
    }

    pub async fn update_profile(&self, update: &UserUpdate) -> Result<User> {
        let account = self.current_account()?;
        let mut user = self.api.update_me(update).await?;
        user.account_id = Some(account.id);
        self.cache.upsert(&user)?;
        Ok(user)
    }

    fn establish(&self, session: AuthSession) -> Result<AuthSession> {
        self.cache.write(
            CacheChange::Upserted {
                kind: EntityKind::Account,
                id: session.account.id.clone(),
            },
            |db| db.save_session(&session),
        )?;
        self.api.set_token(Some(session.account.access_token.clone()));
        info!(user = %session.user.id, "Signed in");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use teamhub_shared::{fixtures, Workspace};

    use crate::testing;

    fn session() -> AuthSession {
        AuthSession {
            account: fixtures::account("a-1", "ann@example.com"),
            user: fixtures::user("u-1", "ann@example.com"),
        }
    }

    fn auth_router() -> Router {
        Router::new()
            .route("/auth/login", post(|| async { Json(session()) }))
            .route(
                "/auth/refresh",
                post(|Json(body): Json<serde_json::Value>| async move {
                    assert_eq!(body["refreshToken"], "refresh-a-1");
                    let mut s = session();
                    s.account.access_token = "token-rotated".into();
                    Json(s)
                }),
            )
            .route(
                "/auth/logout",
                post(|headers: HeaderMap| async move {
                    assert_eq!(headers["authorization"], "Bearer token-a-1");
                    StatusCode::NO_CONTENT
                }),
            )
    }

    #[tokio::test]
    async fn login_persists_session_and_sets_token() {
        let (api, cache) = testing::api_and_cache(auth_router()).await;
        let repo = SessionRepository::new(api.clone(), cache.clone());

        repo.login("ann@example.com", "pw").await.unwrap();

        assert!(api.has_token());
        let user = repo.current_user().unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.account_id.as_deref(), Some("a-1"));
    }

    #[tokio::test]
    async fn restore_then_refresh_rotates_token() {
        let (api, cache) = testing::api_and_cache(auth_router()).await;
        cache.write_untracked(|db| db.save_session(&session())).unwrap();

        let repo = SessionRepository::new(api.clone(), cache);
        let restored = repo.restore_session().unwrap().unwrap();
        assert_eq!(restored.account.access_token, "token-a-1");
        assert!(api.has_token());

        repo.refresh().await.unwrap();
        assert_eq!(repo.current_account().unwrap().access_token, "token-rotated");
    }

    #[tokio::test]
    async fn logout_clears_cache_even_when_offline() {
        let cache = LocalCache::open_in_memory().unwrap();
        cache.write_untracked(|db| db.save_session(&session())).unwrap();
        cache.upsert(&fixtures::workspace("w-1")).unwrap();

        let api = testing::offline_api();
        let repo = SessionRepository::new(api.clone(), cache.clone());
        repo.restore_session().unwrap();

        repo.logout().await.unwrap();

        assert!(!api.has_token());
        assert!(repo.restore_session().unwrap().is_none());
        assert!(cache.read(|db| db.list_all::<Workspace>()).unwrap().is_empty());
        assert!(matches!(
            repo.current_user().unwrap_err(),
            ClientError::NotAuthenticated
        ));
    }

    #[test]
    fn restore_without_session_is_none() {
        let repo = SessionRepository::new(
            testing::offline_api(),
            LocalCache::open_in_memory().unwrap(),
        );
        assert!(repo.restore_session().unwrap().is_none());
    }
}
