//! Admin handlers
//!
//! Doctor approval workflow and platform counts.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{parse_id, parse_status};
use crate::app::AdminStats;
use crate::domain::entities::{ApprovalStatus, Doctor, DoctorId, ADMIN_DASHBOARD_PATH};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AdminLoginRequest {
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    /// Send as `Authorization: Bearer <token>` on admin routes
    pub token: String,
    pub redirect: &'static str,
}

/// Query parameters for listing doctors
#[derive(Debug, Default, Deserialize)]
pub struct DoctorListQuery {
    /// pending, approved or rejected; all doctors when omitted
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

/// POST /api/admin/login
pub async fn admin_login(
    State(state): State<AppState>,
    body: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<Json<AdminLoginResponse>, AppError> {
    let Json(request) = body?;
    let token = state.admin_service.login(request.password.as_deref())?;

    Ok(Json(AdminLoginResponse {
        token,
        redirect: ADMIN_DASHBOARD_PATH,
    }))
}

/// GET /api/admin/doctors?status=
///
/// Doctors newest first, optionally filtered by approval status.
pub async fn list_doctors(
    State(state): State<AppState>,
    Query(query): Query<DoctorListQuery>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    let status = parse_status::<ApprovalStatus>(query.status.as_deref())?;
    let doctors = state.admin_service.list_doctors(status).await?;
    Ok(Json(doctors))
}

/// POST /api/admin/doctors/:id/approve
pub async fn approve_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Doctor>, AppError> {
    let id = DoctorId(parse_id(&id)?);
    let doctor = state.admin_service.approve_doctor(&id).await?;
    Ok(Json(doctor))
}

/// POST /api/admin/doctors/:id/reject
///
/// The body is optional; when present it may carry a reason.
pub async fn reject_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<RejectRequest>>,
) -> Result<Json<Doctor>, AppError> {
    let id = DoctorId(parse_id(&id)?);
    let reason = body.and_then(|Json(request)| request.reason);

    let doctor = state
        .admin_service
        .reject_doctor(&id, reason.as_deref())
        .await?;
    Ok(Json(doctor))
}

/// GET /api/admin/stats
pub async fn admin_stats(State(state): State<AppState>) -> Result<Json<AdminStats>, AppError> {
    Ok(Json(state.admin_service.stats().await?))
}
