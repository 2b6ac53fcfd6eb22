//! Auth handlers
//!
//! Registration, sign-in, session refresh and the post-login redirect.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::Redirect,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::{user_type_of, Account, RegistrationForm};
use crate::auth::{bearer_from_headers, Session};
use crate::domain::entities::{redirect_target, ApprovalStatus, AuthSession, AuthUser, UserType};
use crate::error::{AppError, SupabaseError};
use crate::AppState;

/// Request body for sign-in
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for session refresh
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Query parameters of the redirect endpoint
#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    /// Page the user was trying to reach
    pub next: Option<String>,
}

/// Response body for registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub email: String,
    pub user_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_status: Option<ApprovalStatus>,
    /// Where the frontend should go next
    pub redirect: &'static str,
    /// Present when the account can be used right away
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<AuthSession>,
    pub message: &'static str,
}

/// Response body for sign-in
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub session: AuthSession,
    pub user_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_status: Option<ApprovalStatus>,
    pub redirect: &'static str,
}

/// Response body for the current user
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: AuthUser,
    pub user_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_status: Option<ApprovalStatus>,
    pub redirect: &'static str,
    pub profile: Option<Account>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// POST /api/auth/register
///
/// Create an account and its doctor or patient profile.
/// Doctors start pending and land on the approval page.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegistrationForm>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let Json(form) = body?;
    let registered = state.auth_service.register(&form).await?;

    let user_type = registered.account.user_type();
    let (user_id, email) = match &registered.account {
        Account::Doctor(doctor) => (doctor.id.0, doctor.email.clone()),
        Account::Patient(patient) => (patient.id.0, patient.email.clone()),
    };

    let message = match (user_type, registered.session.is_some()) {
        (_, false) => "Registrazione completata. Controlla la tua email per confermare l'account.",
        (UserType::Doctor(_), true) => {
            "Registrazione completata. Il tuo account sarà attivo dopo l'approvazione di un amministratore."
        }
        (_, true) => "Registrazione completata.",
    };

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            email,
            user_type: user_type.as_str(),
            doctor_status: user_type.doctor_status(),
            redirect: user_type.redirect_path(),
            session: registered.session,
            message,
        }),
    ))
}

/// POST /api/auth/login
///
/// Sign in with email and password. The response says where to go next.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = body?;
    let signed_in = state
        .auth_service
        .login(request.email.as_deref(), request.password.as_deref())
        .await?;

    let user_type = user_type_of(signed_in.account.as_ref());

    Ok(Json(LoginResponse {
        session: signed_in.session,
        user_type: user_type.as_str(),
        doctor_status: user_type.doctor_status(),
        redirect: user_type.redirect_path(),
    }))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<AuthSession>, AppError> {
    let Json(request) = body?;
    let session = state
        .auth_service
        .refresh(request.refresh_token.as_deref())
        .await?;
    Ok(Json(session))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.auth_service.logout(&session.access_token).await?;
    tracing::debug!(user_id = %session.user.id, "User signed out");
    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/auth/me
///
/// The signed-in user, their type and profile.
pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<MeResponse>, AppError> {
    let profile = state.auth_service.resolve(&session.user.id).await?;
    let user_type = user_type_of(profile.as_ref());

    Ok(Json(MeResponse {
        user: session.user,
        user_type: user_type.as_str(),
        doctor_status: user_type.doctor_status(),
        redirect: user_type.redirect_path(),
        profile,
    }))
}

/// GET /api/auth/redirect?next=
///
/// Send the browser to the right page for whoever is signed in.
/// Accepts a user access token or the admin token; both are optional.
pub async fn redirect(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RedirectQuery>,
) -> Result<Redirect, AppError> {
    let user_type = match bearer_from_headers(&headers) {
        None => None,
        Some(token) if state.admin_service.is_admin_token(token) => Some(UserType::Admin),
        Some(token) => match state.auth_service.authenticate(token).await {
            Ok(user) => {
                let account = state.auth_service.resolve(&user.id).await?;
                Some(user_type_of(account.as_ref()))
            }
            Err(AppError::Supabase(SupabaseError::InvalidToken)) => None,
            Err(e) => return Err(e),
        },
    };

    let target = redirect_target(user_type, query.next.as_deref());
    Ok(Redirect::temporary(&target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_login_request() {
        let json = r#"{"email": "mario.rossi@example.com", "password": "secret"}"#;
        let request: LoginRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.email.as_deref(), Some("mario.rossi@example.com"));
        assert_eq!(request.password.as_deref(), Some("secret"));
    }

    #[test]
    fn parse_login_request_missing_fields() {
        let request: LoginRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(request.email.is_none());
        assert!(request.password.is_none());
    }

    #[test]
    fn parse_registration_form() {
        let json = r#"{
            "email": "anna.bianchi@example.com",
            "password": "secret1",
            "user_type": "doctor",
            "first_name": "Anna",
            "last_name": "Bianchi",
            "specialization": "Cardiologia",
            "license_number": "MI-12345"
        }"#;
        let form: RegistrationForm = serde_json::from_str(json).unwrap();
        assert_eq!(form.user_type.as_deref(), Some("doctor"));
        assert_eq!(form.specialization.as_deref(), Some("Cardiologia"));
        assert!(form.fiscal_code.is_none());
    }

    #[test]
    fn login_response_flattens_session() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: "anna.bianchi@example.com".to_string(),
        };
        let response = LoginResponse {
            session: AuthSession {
                access_token: "access".to_string(),
                refresh_token: "refresh".to_string(),
                token_type: "bearer".to_string(),
                expires_in: 3600,
                user,
            },
            user_type: "doctor",
            doctor_status: Some(ApprovalStatus::Pending),
            redirect: "/pending-approval",
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["access_token"], "access");
        assert_eq!(json["expires_in"], 3600);
        assert_eq!(json["user"]["email"], "anna.bianchi@example.com");
        assert_eq!(json["doctor_status"], "pending");
        assert_eq!(json["redirect"], "/pending-approval");
    }

    #[test]
    fn patient_login_response_omits_doctor_status() {
        let response = LoginResponse {
            session: AuthSession {
                access_token: "access".to_string(),
                refresh_token: "refresh".to_string(),
                token_type: "bearer".to_string(),
                expires_in: 3600,
                user: AuthUser {
                    id: Uuid::new_v4(),
                    email: "p@example.com".to_string(),
                },
            },
            user_type: "patient",
            doctor_status: None,
            redirect: "/dashboard/patient",
        };

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("doctor_status").is_none());
    }
}
