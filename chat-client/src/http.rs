use crate::auth::token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
use crate::auth::SessionGuard;
use crate::config::ApiSettings;
use client_core::error::ApiError;
use client_core::retry::{retry_http, RetryConfig};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Routes reachable without a bearer token. Requests here are sent as-is
/// and a 401 on them never triggers a refresh.
const PUBLIC_ROUTES: &[&str] = &["auth/verify", "refresh-token"];

/// HTTP client for the chat backend.
///
/// Every non-public request carries a non-expired bearer token (refreshing
/// first when needed), retryable failures get bounded backoff retry, and a
/// 401 is answered with one refresh exchange and one replay of the
/// original request.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionGuard>,
    retry: RetryConfig,
}

impl ApiClient {
    /// Build a client whose token store is chosen by the settings:
    /// file-backed when `token_file` is set, in-memory otherwise.
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let store: Arc<dyn TokenStore> = match &settings.token_file {
            Some(path) => Arc::new(FileTokenStore::new(path.clone())),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Self::with_store(settings, store)
    }

    pub fn with_store(
        settings: &ApiSettings,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let session = Arc::new(SessionGuard::new(settings, store)?);

        Ok(Self {
            http,
            base_url: settings.base().to_string(),
            session,
            retry: RetryConfig::with_max_retries(settings.max_retries),
        })
    }

    pub fn session(&self) -> &Arc<SessionGuard> {
        &self.session
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        self.session.store()
    }

    fn is_public(path: &str) -> bool {
        PUBLIC_ROUTES.contains(&path.trim_start_matches('/'))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn build(
        &self,
        method: &Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
        bearer: Option<String>,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let mut request = self.http.request(method.clone(), self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        if !Self::is_public(path) {
            let token = match bearer {
                Some(token) => token,
                None => self.session.bearer().await?,
            };
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, message))
    }

    /// Send a request, retrying transient failures, and answering one 401
    /// with one refresh-and-replay.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<Response, ApiError> {
        let result = retry_http(&self.retry, path, || async {
            let request = self
                .build(&method, path, query, body.as_ref(), None)
                .await?;
            Self::send(request).await
        })
        .await;

        match result {
            Err(ApiError::Unauthorized) if !Self::is_public(path) => {
                // The server rejected a token we considered fresh; force one
                // exchange and replay the original request once.
                let token = self.session.refresh_access_token().await?;
                let request = self
                    .build(&method, path, query, body.as_ref(), Some(token))
                    .await?;
                Self::send(request).await
            }
            other => other,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self.execute(Method::GET, path, query, None).await?;
        Ok(response.json().await?)
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::POST, path, &[], Some(body)).await?;
        Ok(response.json().await?)
    }

    pub async fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::PUT, path, &[], Some(body)).await?;
        Ok(response.json().await?)
    }

    pub async fn patch_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::PATCH, path, &[], Some(body)).await?;
        Ok(response.json().await?)
    }

    /// DELETE, discarding any response body.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, &[], None).await?;
        Ok(())
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::DELETE, path, &[], None).await?;
        Ok(response.json().await?)
    }

    /// POST a multipart form. The body is not replayable, so uploads are
    /// sent exactly once: no backoff retry and no 401 replay.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        let token = self.session.bearer().await?;
        let request = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .multipart(form);
        let response = Self::send(request).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_route_detection() {
        assert!(ApiClient::is_public("auth/verify"));
        assert!(ApiClient::is_public("/refresh-token"));
        assert!(!ApiClient::is_public("chats"));
        assert!(!ApiClient::is_public("users/me"));
    }
}
