use crate::http::ApiClient;
use crate::models::auth::{AuthVerifyRequest, AuthVerifyResponse};
use crate::models::user::User;
use client_core::error::ApiError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    user: User,
}

/// Login, logout and profile operations.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange a social-login ID token for a session.
    ///
    /// On success the returned token pair is stored, so subsequent calls on
    /// the same client are authenticated.
    pub async fn verify(&self, request: &AuthVerifyRequest) -> Result<AuthVerifyResponse, ApiError> {
        let response: AuthVerifyResponse = self.client.post_json("auth/verify", request).await?;
        self.client.store().set_tokens(&response.tokens);
        Ok(response)
    }

    /// Invalidate the session server-side and drop the local pair.
    ///
    /// The server call is best-effort: a failure is logged and the local
    /// pair is cleared regardless.
    pub async fn logout(&self) {
        if self.client.session().has_session() {
            if let Err(err) = self
                .client
                .post_json::<serde_json::Value, _>("auth/logout", &serde_json::json!({}))
                .await
            {
                tracing::warn!(error = %err, "Server logout failed");
            }
        }
        self.client.session().clear();
    }

    pub async fn profile(&self) -> Result<User, ApiError> {
        let response: ProfileResponse = self.client.get_json("users/me", &[]).await?;
        Ok(response.user)
    }
}
