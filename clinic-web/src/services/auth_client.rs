//! Client for the hosted auth provider.
//!
//! Sessions are owned entirely by the provider: this service forwards the
//! browser's session cookie, and the provider answers with the authenticated
//! user (if any) plus an optional refreshed cookie to hand back to the client.

use crate::config::AuthSettings;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{COOKIE, SET_COOKIE};
use serde::{Deserialize, Serialize};

/// Name of the provider-managed session cookie.
pub const SESSION_COOKIE: &str = "clinic_session";

/// An authenticated principal, as reported by the provider. The identity is
/// opaque; nothing in this service verifies it locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
}

/// Outcome of a provider call: the validated session (if any) and a refreshed
/// cookie that must be propagated back to the browser when present.
#[derive(Debug, Clone, Default)]
pub struct SessionHandoff {
    pub session: Option<Session>,
    pub set_cookie: Option<String>,
}

impl SessionHandoff {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Validate and refresh the session carried by the inbound cookie header.
    async fn refresh(&self, cookie: Option<&str>) -> Result<SessionHandoff, AppError>;

    /// Exchange email/password credentials for a session cookie.
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionHandoff, AppError>;

    /// Revoke the session carried by the inbound cookie header.
    async fn sign_out(&self, cookie: Option<&str>) -> Result<(), AppError>;

    /// Exchange a confirmation/callback code for a session cookie.
    async fn exchange_code(&self, code: &str) -> Result<SessionHandoff, AppError>;
}

pub struct AuthClient {
    client: Client,
    settings: AuthSettings,
}

impl AuthClient {
    pub fn new(settings: AuthSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.url, path)
    }

    async fn handoff_from(response: reqwest::Response) -> Result<SessionHandoff, AppError> {
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        // The provider answers 401 for missing/expired/invalid sessions;
        // that is an anonymous request, not a failure.
        if response.status().as_u16() == 401 {
            return Ok(SessionHandoff {
                session: None,
                set_cookie,
            });
        }

        if !response.status().is_success() {
            return Err(AppError::InternalError(anyhow::anyhow!(
                "Auth provider returned {}",
                response.status()
            )));
        }

        #[derive(Deserialize)]
        struct UserEnvelope {
            user: ProviderUser,
        }

        #[derive(Deserialize)]
        struct ProviderUser {
            id: String,
            email: Option<String>,
        }

        let envelope: UserEnvelope = response.json().await.map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Malformed auth provider response: {}", e))
        })?;

        Ok(SessionHandoff {
            session: Some(Session {
                user_id: envelope.user.id,
                email: envelope.user.email,
            }),
            set_cookie,
        })
    }
}

#[async_trait]
impl SessionProvider for AuthClient {
    async fn refresh(&self, cookie: Option<&str>) -> Result<SessionHandoff, AppError> {
        let url = self.url("/session/refresh");
        let mut request = self.client.post(&url);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to reach auth provider at {}: {}", url, e);
            AppError::InternalError(anyhow::anyhow!("Auth provider unreachable: {}", e))
        })?;

        Self::handoff_from(response).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionHandoff, AppError> {
        let url = self.url("/token");
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach auth provider at {}: {}", url, e);
                AppError::InternalError(anyhow::anyhow!("Auth provider unreachable: {}", e))
            })?;

        Self::handoff_from(response).await
    }

    async fn sign_out(&self, cookie: Option<&str>) -> Result<(), AppError> {
        let url = self.url("/logout");
        let mut request = self.client.post(&url);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        request.send().await.map_err(|e| {
            tracing::error!("Failed to reach auth provider at {}: {}", url, e);
            AppError::InternalError(anyhow::anyhow!("Auth provider unreachable: {}", e))
        })?;

        Ok(())
    }

    async fn exchange_code(&self, code: &str) -> Result<SessionHandoff, AppError> {
        let url = self.url("/session/exchange");
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "code": code }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach auth provider at {}: {}", url, e);
                AppError::InternalError(anyhow::anyhow!("Auth provider unreachable: {}", e))
            })?;

        Self::handoff_from(response).await
    }
}
