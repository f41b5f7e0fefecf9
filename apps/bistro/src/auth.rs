//! # Bearer Token Handling
//!
//! The client never validates tokens; it only avoids sending one the server
//! would reject for being expired. JWT payloads are decoded (unverified) to
//! read the `exp` claim. Opaque tokens are assumed usable.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Claims the client reads from a JWT payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub exp: Option<u64>,
}

/// Decode the payload segment of a JWT. `None` for anything else.
#[must_use]
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Whether the token's `exp` is at or before `now` (seconds since epoch).
#[must_use]
pub fn is_expired_at(token: &str, now: u64) -> bool {
    decode_claims(token)
        .and_then(|claims| claims.exp)
        .is_some_and(|exp| exp <= now)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// The token, if present, non-empty and not expired.
#[must_use]
pub fn usable_token(token: Option<&str>) -> Option<&str> {
    token
        .filter(|t| !t.trim().is_empty())
        .filter(|t| !is_expired_at(t, now_secs()))
}
