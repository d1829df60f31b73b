//! Static API key scheme. Only presence is checked, never the value.

use axum::http::HeaderMap;

use super::AuthOutcome;

/// Header carrying the API key
pub const X_API_KEY: &str = "X-Api-Key";

/// Extracts the raw API key, if one was sent and is non-empty
pub fn extract_api_key(headers: &HeaderMap) -> Option<&[u8]> {
    headers
        .get(X_API_KEY)
        .map(|value| value.as_bytes())
        .filter(|value| !value.is_empty())
}

pub fn verify(headers: &HeaderMap) -> AuthOutcome {
    match extract_api_key(headers) {
        Some(_) => AuthOutcome::Authorized,
        None => AuthOutcome::Unauthorized { challenge: None },
    }
}
