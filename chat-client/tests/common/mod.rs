#![allow(dead_code)]

use base64::{engine::general_purpose, Engine as _};
use chat_client::auth::{MemoryTokenStore, TokenStore};
use chat_client::config::ApiSettings;
use chat_client::models::auth::TokenPair;
use chat_client::ApiClient;
use std::sync::Arc;

/// An unsigned JWT whose `exp` claim is `exp`; the client never checks
/// signatures, only claims.
pub fn make_token(sub: &str, exp: i64) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload =
        general_purpose::URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{sub}","exp":{exp}}}"#));
    format!("{header}.{payload}.signature")
}

pub fn fresh_token(sub: &str) -> String {
    make_token(sub, chrono::Utc::now().timestamp() + 3600)
}

pub fn expired_token(sub: &str) -> String {
    make_token(sub, chrono::Utc::now().timestamp() - 3600)
}

pub fn settings(base_url: &str) -> ApiSettings {
    ApiSettings::new(base_url)
}

/// Client over an in-memory store seeded with the given pair.
pub fn client_with_tokens(
    base_url: &str,
    access: &str,
    refresh: &str,
) -> (ApiClient, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::new());
    store.set_tokens(&TokenPair {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
    });
    let client = ApiClient::with_store(&settings(base_url), store.clone())
        .expect("client should build");
    (client, store)
}

/// Minimal chat JSON as the backend serves it.
pub fn chat_json(id: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "_id": id,
        "userId": "u1",
        "title": title,
        "initMsg": { "contents": [], "isThinking": false },
        "language": "en",
        "createdAt": "2025-06-01T10:00:00Z",
        "updatedAt": "2025-06-01T10:00:00Z",
    })
}

pub fn user_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "email": "test@example.com",
        "name": "Test User",
        "picture": "https://example.com/p.png",
        "createdAt": "2025-06-01T10:00:00Z",
        "updatedAt": "2025-06-01T10:00:00Z",
    })
}
