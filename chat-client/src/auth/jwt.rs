use base64::{engine::general_purpose, Engine as _};
use client_core::error::ApiError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub sub: Option<String>,
}

/// Decode JWT claims without validation.
///
/// The client never verifies signatures; it only needs the `exp` claim to
/// decide whether to refresh before a request. The server remains the
/// authority on token validity.
pub fn decode_claims(token: &str) -> Result<JwtClaims, ApiError> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return Err(ApiError::InvalidToken("not a JWT".into()));
    }

    // Decode the payload (second part)
    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| ApiError::InvalidToken(format!("payload is not base64: {e}")))?;

    let claims: JwtClaims = serde_json::from_slice(&payload)
        .map_err(|e| ApiError::InvalidToken(format!("claims do not parse: {e}")))?;

    Ok(claims)
}

/// Whether the token's `exp` claim lies strictly in the past of `now`
/// (seconds since the epoch). Undecodable tokens count as expired.
pub fn is_expired_at(token: &str, now: i64) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.exp < now,
        Err(_) => true,
    }
}

/// [`is_expired_at`] against the current wall clock.
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, chrono::Utc::now().timestamp())
}
