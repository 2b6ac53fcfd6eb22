//! Admin authentication
//!
//! The admin has no account: the `ADMIN_PASSWORD` value itself is the
//! bearer token. Comparison goes through an HMAC keyed with a per-process
//! random key so it runs in constant time.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use super::extract_bearer;
use crate::error::AppError;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// The configured admin password, kept only as a keyed digest
#[derive(Clone)]
pub struct AdminPassword {
    key: [u8; 32],
    expected: Vec<u8>,
}

impl AdminPassword {
    pub fn new(password: &str) -> Self {
        let key: [u8; 32] = rand::thread_rng().gen();
        let expected = if password.is_empty() {
            Vec::new()
        } else {
            digest(&key, password).unwrap_or_default()
        };
        Self { key, expected }
    }

    /// Whether the candidate equals the configured password.
    /// Always false when no password is configured.
    pub fn matches(&self, candidate: &str) -> bool {
        if self.expected.is_empty() {
            return false;
        }

        let Ok(mut mac) = HmacSha256::new_from_slice(&self.key) else {
            return false;
        };
        mac.update(candidate.as_bytes());
        mac.verify_slice(&self.expected).is_ok()
    }
}

fn digest(key: &[u8], value: &str) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(value.as_bytes());
    Some(mac.finalize().into_bytes().to_vec())
}

/// Admin middleware
///
/// Lets the request through only when the bearer token is the admin password.
pub async fn admin_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(&request).ok_or(AppError::Unauthorized)?;

    if !state.admin_service.is_admin_token(token) {
        tracing::warn!("Rejected admin request with wrong token");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
