//! Basic-auth forwarding.
//!
//! The service keeps no credentials of its own: whatever the caller sends
//! is used to log in to the appliance named in the path.

use axum::http::{HeaderMap, header};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use balance_core::Credentials;
use secrecy::SecretString;

use crate::error::ServiceError;

/// Auth realm advertised for `host`.
pub fn realm(host: &str) -> String {
    format!("node-{host}")
}

/// Decode `Authorization: Basic ...`. `None` when absent or malformed.
pub fn basic_credentials(headers: &HeaderMap) -> Option<Credentials> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some(Credentials {
        username: username.to_owned(),
        password: SecretString::from(password.to_owned()),
    })
}

/// Credentials for `host`, or a 401 naming its realm.
pub fn require_credentials(headers: &HeaderMap, host: &str) -> Result<Credentials, ServiceError> {
    basic_credentials(headers).ok_or_else(|| ServiceError::Unauthorized { realm: realm(host) })
}
