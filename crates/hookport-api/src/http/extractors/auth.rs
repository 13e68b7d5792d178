//! API key extraction.
//!
//! Reads the caller's key from:
//! - `Authorization: Bearer <key>` header
//! - `X-API-Key: <key>` header
//!
//! Verification happens in the intake, so a missing key is not a rejection
//! here. Headers that are not valid UTF-8 are treated as absent.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use secrecy::SecretString;

const API_KEY_HEADER: &str = "x-api-key";

/// Extract the API key from request headers, if one was supplied.
pub fn extract_api_key(headers: &HeaderMap) -> Option<SecretString> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|key| !key.is_empty());

    if let Some(key) = bearer {
        return Some(SecretString::from(key.to_string()));
    }

    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(|key| SecretString::from(key.to_string()))
}
