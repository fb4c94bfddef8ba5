//! Request authentication
//!
//! Every reload request must carry the shared secret in a configurable
//! header. For `Authorization` the value is a `Bearer` token; any other
//! header carries the raw token.

use axum::http::{HeaderMap, HeaderName, header::AUTHORIZATION};

/// Checks the shared secret carried by incoming requests
#[derive(Debug, Clone)]
pub struct Authenticator {
    header: HeaderName,
    secret: String,
}

impl Authenticator {
    pub fn new(header: HeaderName, secret: impl Into<String>) -> Self {
        Self {
            header,
            secret: secret.into(),
        }
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// Returns true when the request carries the expected token
    pub fn verify(&self, headers: &HeaderMap) -> bool {
        let Some(value) = headers.get(&self.header) else {
            return false;
        };
        let Ok(value) = value.to_str() else {
            return false;
        };

        let token = if self.header == AUTHORIZATION {
            match value.strip_prefix("Bearer ") {
                Some(token) => token.trim(),
                None => return false,
            }
        } else {
            value.trim()
        };

        constant_time_eq(token.as_bytes(), self.secret.as_bytes())
    }
}

/// Compares two byte strings without short-circuiting on the first mismatch
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
