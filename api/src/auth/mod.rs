//! Request authentication
//!
//! - `session`: bearer access tokens issued by the auth service
//! - `admin`: the shared admin password used directly as a bearer token

pub mod admin;
pub mod session;

use axum::{body::Body, http::Request};

pub use admin::{admin_middleware, AdminPassword};
pub use session::{session_middleware, Session};

/// Extract the bearer token from the Authorization header
pub fn extract_bearer(request: &Request<Body>) -> Option<&str> {
    bearer_from_headers(request.headers())
}

pub fn bearer_from_headers(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
