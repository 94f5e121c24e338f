use crate::auth::jwt;
use crate::auth::token_store::TokenStore;
use crate::config::ApiSettings;
use crate::models::auth::TokenPair;
use client_core::error::ApiError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    /// Absent when the server rotates only the access token.
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Keeps the bearer token attached to outgoing requests non-expired.
///
/// Refreshes are single-flight: concurrent callers that hit an expired
/// access token share one `refresh-token` exchange instead of each issuing
/// their own.
pub struct SessionGuard {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    refresh_gate: Mutex<()>,
}

impl SessionGuard {
    pub fn new(settings: &ApiSettings, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        // Bare client: refresh calls bypass the auth hooks and retry policy.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base().to_string(),
            store,
            refresh_gate: Mutex::new(()),
        })
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Whether a token pair is currently held, expired or not.
    pub fn has_session(&self) -> bool {
        self.store.token_pair().is_some()
    }

    /// A non-expired access token for the next request, refreshing if the
    /// stored one has run out.
    pub async fn bearer(&self) -> Result<String, ApiError> {
        match self.store.access_token() {
            Some(token) if !jwt::is_expired(&token) => Ok(token),
            _ => self.refresh_access_token().await,
        }
    }

    /// Exchange the refresh token for a fresh access token.
    ///
    /// Callers queued behind an in-flight exchange re-check the store once
    /// the gate opens and reuse its result, so one expiry window costs one
    /// network call. A failed exchange clears the stored pair; there is no
    /// second attempt.
    pub async fn refresh_access_token(&self) -> Result<String, ApiError> {
        let stale = self.store.access_token();
        let _gate = self.refresh_gate.lock().await;

        // Reuse an exchange that completed while we waited for the gate.
        // Comparing against the token we entered with (rather than checking
        // expiry) also covers a server-side rejection of a token whose
        // `exp` still looks valid locally.
        if let Some(current) = self.store.access_token() {
            if stale.as_deref() != Some(current.as_str()) && !jwt::is_expired(&current) {
                return Ok(current);
            }
        }

        let refresh_token = self.store.refresh_token().ok_or(ApiError::SessionExpired)?;
        if jwt::is_expired(&refresh_token) {
            self.store.clear();
            return Err(ApiError::SessionExpired);
        }

        match self.exchange(&refresh_token).await {
            Ok(pair) => {
                self.store.set_tokens(&pair);
                tracing::debug!("Access token refreshed");
                Ok(pair.access_token)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Token refresh failed, clearing session");
                self.store.clear();
                Err(err)
            }
        }
    }

    async fn exchange(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let url = format!("{}/refresh-token", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, message));
        }

        let body: RefreshResponse = response.json().await?;
        Ok(TokenPair {
            access_token: body.access_token,
            refresh_token: body
                .refresh_token
                .unwrap_or_else(|| refresh_token.to_string()),
        })
    }

    /// Drop the local session without touching the server.
    pub fn clear(&self) {
        self.store.clear();
    }
}
