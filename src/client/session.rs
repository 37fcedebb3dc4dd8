//! Session lifecycle over the typed client: sign-in, sign-up, sign-out,
//! the current-user lookup, and a background credential refresh that keeps
//! a long-lived client signed in. A failed refresh forces sign-out.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use validator::Validate;

use super::http::ApiClient;
use super::{ApiError, ApiResult};
use crate::auth::{AuthResponse, AuthUser, LoginRequest, RegisterRequest};
use crate::error::ErrorKind;

/// Cadence of the background credential refresh while signed in.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(20 * 60);

/// Clones share one signed-in state, like the collections they sit beside.
#[derive(Clone)]
pub struct Session {
    client: ApiClient,
    user: Arc<RwLock<Option<AuthUser>>>,
    refresher: Arc<Mutex<Option<JoinHandle<()>>>>,
}

#[derive(Deserialize)]
struct RegisterResponse {
    user: AuthUser,
}

impl Session {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            user: Arc::new(RwLock::new(None)),
            refresher: Arc::new(Mutex::new(None)),
        }
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<AuthUser> {
        self.user
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user().is_some()
    }

    /// Resume a session persisted by an earlier run. Returns the signed-in
    /// user when the stored credential is still accepted; a rejected
    /// credential has already been cleared by the transport by the time
    /// this returns `None`.
    pub async fn restore(&self) -> ApiResult<Option<AuthUser>> {
        if self.client.credentials().token().is_none() {
            return Ok(None);
        }
        match self.client.get::<AuthUser>("/auth/me", &[]).await {
            Ok(user) => {
                self.set_user(Some(user.clone()));
                self.start_refresh_loop();
                Ok(Some(user))
            }
            Err(err) if err.kind == ErrorKind::Unauthorized => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ApiResult<AuthUser> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        if let Err(errors) = request.validate() {
            return Err(ApiError::from_validation(errors));
        }
        let response: AuthResponse = self.client.post("/auth/login", &request).await?;
        self.client.credentials().set(&response.access_token);
        self.set_user(Some(response.user.clone()));
        self.start_refresh_loop();
        info!(user_id = %response.user.id, "signed in");
        Ok(response.user)
    }

    /// Register a new account. The caller still signs in afterwards.
    pub async fn sign_up(&self, request: RegisterRequest) -> ApiResult<AuthUser> {
        if let Err(errors) = request.validate() {
            return Err(ApiError::from_validation(errors));
        }
        let response: RegisterResponse = self.client.post("/auth/register", &request).await?;
        Ok(response.user)
    }

    /// Discard the credential and stop refreshing. Tokens are stateless on
    /// the server, so the logout call itself is best-effort.
    pub async fn sign_out(&self) {
        let _ = self
            .client
            .post::<serde_json::Value, _>("/auth/logout", &serde_json::json!({}))
            .await;
        self.end_session();
    }

    pub async fn current_user(&self) -> ApiResult<AuthUser> {
        let user: AuthUser = self.client.get("/auth/me", &[]).await?;
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    /// Mint a fresh token for the signed-in user and store it.
    pub async fn refresh(&self) -> ApiResult<AuthUser> {
        let response: AuthResponse = self
            .client
            .post("/auth/refresh", &serde_json::json!({}))
            .await?;
        self.client.credentials().set(&response.access_token);
        self.set_user(Some(response.user.clone()));
        Ok(response.user)
    }

    fn set_user(&self, user: Option<AuthUser>) {
        *self
            .user
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = user;
    }

    fn end_session(&self) {
        self.client.credentials().clear();
        self.set_user(None);
        let handle = self
            .refresher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    fn start_refresh_loop(&self) {
        let session = self.clone();
        let mut guard = self
            .refresher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(old) = guard.take() {
            old.abort();
        }
        *guard = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(REFRESH_INTERVAL);
            // The first tick completes immediately; the loop only acts on
            // the ticks after it.
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(err) = session.refresh().await {
                    warn!(%err, "credential refresh failed; signing out");
                    session.client.credentials().clear();
                    session.set_user(None);
                    break;
                }
            }
        }));
    }
}
