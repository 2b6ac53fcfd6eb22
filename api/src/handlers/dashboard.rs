//! Dashboard handlers

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::app::{Account, InviteDetails};
use crate::auth::Session;
use crate::domain::entities::{Doctor, InviteStatus, Patient};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DoctorDashboard {
    pub profile: Doctor,
    pub patients: Vec<Patient>,
    pub pending_invites: Vec<InviteDetails>,
}

#[derive(Debug, Serialize)]
pub struct PatientDashboard {
    pub profile: Patient,
    pub doctors: Vec<Doctor>,
    pub pending_invites: Vec<InviteDetails>,
}

/// GET /api/dashboard/doctor
///
/// Only approved doctors get here; others are told where to go instead.
pub async fn doctor_dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<DoctorDashboard>, AppError> {
    let doctor = state.auth_service.require_doctor(&session.user).await?;

    let patients = state.connection_service.connected_patients(&doctor).await?;
    let account = Account::Doctor(doctor.clone());
    let pending_invites = state
        .connection_service
        .list_invites(&account, Some(InviteStatus::Pending))
        .await?;

    Ok(Json(DoctorDashboard {
        profile: doctor,
        patients,
        pending_invites,
    }))
}

/// GET /api/dashboard/patient
pub async fn patient_dashboard(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<PatientDashboard>, AppError> {
    let patient = state.auth_service.require_patient(&session.user).await?;

    let doctors = state.connection_service.connected_doctors(&patient).await?;
    let account = Account::Patient(patient.clone());
    let pending_invites = state
        .connection_service
        .list_invites(&account, Some(InviteStatus::Pending))
        .await?;

    Ok(Json(PatientDashboard {
        profile: patient,
        doctors,
        pending_invites,
    }))
}
