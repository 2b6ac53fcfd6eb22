//! Session authentication middleware

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use super::extract_bearer;
use crate::domain::entities::AuthUser;
use crate::error::AppError;
use crate::AppState;

/// The signed-in user, injected into request extensions
#[derive(Debug, Clone)]
pub struct Session {
    pub user: AuthUser,
    /// Kept so the session can be revoked on logout
    pub access_token: String,
}

/// Authentication middleware
///
/// Validates the access token with the auth service and injects the
/// Session into request extensions.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let access_token = extract_bearer(&request)
        .ok_or(AppError::Unauthorized)?
        .to_string();

    let user = state.auth_service.authenticate(&access_token).await?;

    request.extensions_mut().insert(Session { user, access_token });

    Ok(next.run(request).await)
}
