//! Connection handlers
//!
//! Doctor search and the invite flow between patients and doctors.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use super::{parse_id, parse_status};
use crate::app::validation::non_blank;
use crate::app::{Account, InviteDetails, InviteTarget};
use crate::auth::Session;
use crate::domain::entities::{
    Doctor, DoctorId, DoctorSearch, Invite, InviteId, InviteStatus, Patient,
};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for the doctor search
#[derive(Debug, Default, Deserialize)]
pub struct DoctorSearchQuery {
    /// Matched against first and last name
    pub search: Option<String>,
    pub specialization: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InviteListQuery {
    pub status: Option<String>,
}

/// Request to create an invite.
/// Patients name a doctor by id, doctors name a patient by email.
#[derive(Debug, Default, Deserialize)]
pub struct CreateInviteRequest {
    pub doctor_id: Option<String>,
    pub patient_email: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RespondInviteRequest {
    pub accept: Option<bool>,
}

/// GET /api/connections/doctors?search=&specialization=
///
/// Approved doctors, ordered by last name then first name.
pub async fn list_doctors(
    State(state): State<AppState>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    // Blank parameters mean no filter
    let search = DoctorSearch {
        search: non_blank(query.search.as_deref()).map(str::to_string),
        specialization: non_blank(query.specialization.as_deref()).map(str::to_string),
    };
    let doctors = state.connection_service.search_doctors(&search).await?;
    Ok(Json(doctors))
}

/// GET /api/connections/patients
///
/// Patients connected to the calling doctor.
pub async fn list_patients(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<Patient>>, AppError> {
    let doctor = state.auth_service.require_doctor(&session.user).await?;
    let patients = state.connection_service.connected_patients(&doctor).await?;
    Ok(Json(patients))
}

/// GET /api/connections/invites?status=
pub async fn list_invites(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<InviteListQuery>,
) -> Result<Json<Vec<InviteDetails>>, AppError> {
    let status = parse_status::<InviteStatus>(query.status.as_deref())?;
    let account = state.auth_service.require_account(&session.user).await?;
    let invites = state
        .connection_service
        .list_invites(&account, status)
        .await?;
    Ok(Json(invites))
}

/// POST /api/connections/invites/create
pub async fn create_invite(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    body: Result<Json<CreateInviteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Invite>), AppError> {
    let Json(request) = body?;
    let account = state.auth_service.require_account(&session.user).await?;
    let target = invite_target(&account, &request)?;

    let invite = state
        .connection_service
        .create_invite(&account, target, request.message.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(invite)))
}

/// POST /api/connections/invites/:id/respond
pub async fn respond_invite(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    body: Result<Json<RespondInviteRequest>, JsonRejection>,
) -> Result<Json<Invite>, AppError> {
    let id = InviteId(parse_id(&id)?);
    let Json(request) = body?;
    let accept = request
        .accept
        .ok_or_else(|| AppError::BadRequest("Il campo accept è obbligatorio".to_string()))?;

    let account = state.auth_service.require_account(&session.user).await?;
    let invite = state
        .connection_service
        .respond(&account, &id, accept)
        .await?;
    Ok(Json(invite))
}

/// DELETE /api/connections/invites/:id
///
/// Withdraw an invite the caller sent.
pub async fn cancel_invite(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<Invite>, AppError> {
    let id = InviteId(parse_id(&id)?);
    let account = state.auth_service.require_account(&session.user).await?;
    let invite = state.connection_service.cancel(&account, &id).await?;
    Ok(Json(invite))
}

/// Who the invite goes to depends on who sends it
fn invite_target(
    account: &Account,
    request: &CreateInviteRequest,
) -> Result<InviteTarget, AppError> {
    match account {
        Account::Patient(_) => {
            let raw = request
                .doctor_id
                .as_deref()
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| AppError::BadRequest("Il medico è obbligatorio".to_string()))?;
            Ok(InviteTarget::Doctor(DoctorId(parse_id(raw)?)))
        }
        Account::Doctor(_) => {
            let email = request
                .patient_email
                .as_deref()
                .map(str::trim)
                .filter(|email| !email.is_empty())
                .ok_or_else(|| {
                    AppError::BadRequest("L'email del paziente è obbligatoria".to_string())
                })?;
            Ok(InviteTarget::PatientEmail(email.to_string()))
        }
    }
}
