use axum::http::{header, HeaderMap};
use hmac::Mac;

use super::credentials::{CredentialError, HmacSha256};
use super::domain::UserId;

pub const SESSION_COOKIE: &str = "session";

/// Signs and verifies `"{user_id}.{hex hmac}"` session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    mac: HmacSha256,
}

impl SessionKeys {
    pub fn new(secret: &[u8]) -> Result<Self, CredentialError> {
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| CredentialError::InvalidKey)?;
        Ok(Self { mac })
    }

    pub fn issue(&self, user_id: UserId) -> String {
        let raw_id = user_id.to_string();
        let mut mac = self.mac.clone();
        mac.update(raw_id.as_bytes());
        format!("{raw_id}.{}", hex::encode(mac.finalize().into_bytes()))
    }

    /// Returns the signed user id, or `None` for malformed or tampered tokens.
    pub fn verify(&self, token: &str) -> Option<UserId> {
        let (raw_id, signature) = token.split_once('.')?;
        let id = raw_id.parse::<i64>().ok()?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac.clone();
        mac.update(raw_id.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(UserId(id))
    }
}

/// Reads the token from `Authorization: Bearer` first, then the session cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn cleared_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}
