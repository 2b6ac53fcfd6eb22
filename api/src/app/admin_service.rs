//! Admin service
//!
//! The doctor approval workflow and the admin dashboard figures.

use std::sync::Arc;

use serde::Serialize;

use crate::auth::AdminPassword;
use crate::domain::entities::{ApprovalStatus, Doctor, DoctorId, InviteStatus};
use crate::domain::ports::{DoctorRepository, InviteRepository, PatientRepository};
use crate::error::AppError;

/// Counts shown on the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub doctors_pending: u64,
    pub doctors_approved: u64,
    pub doctors_rejected: u64,
    pub patients: u64,
    pub invites_pending: u64,
    pub connections: u64,
}

/// Service for administrator operations
pub struct AdminService {
    doctors: Arc<dyn DoctorRepository>,
    patients: Arc<dyn PatientRepository>,
    invites: Arc<dyn InviteRepository>,
    password: AdminPassword,
}

impl AdminService {
    pub fn new(
        doctors: Arc<dyn DoctorRepository>,
        patients: Arc<dyn PatientRepository>,
        invites: Arc<dyn InviteRepository>,
        password: AdminPassword,
    ) -> Self {
        Self {
            doctors,
            patients,
            invites,
            password,
        }
    }

    /// Check the admin password and hand it back as the bearer token
    pub fn login(&self, password: Option<&str>) -> Result<String, AppError> {
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::BadRequest("Password obbligatoria".to_string()))?;

        if !self.password.matches(password) {
            tracing::warn!("Rejected admin login");
            return Err(AppError::Unauthorized);
        }

        Ok(password.to_string())
    }

    /// Whether a bearer token is the admin token
    pub fn is_admin_token(&self, token: &str) -> bool {
        self.password.matches(token)
    }

    /// List doctors, optionally filtered by approval status
    pub async fn list_doctors(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<Doctor>, AppError> {
        Ok(self.doctors.list_by_status(status).await?)
    }

    /// Approve a doctor so they can use the platform
    pub async fn approve_doctor(&self, id: &DoctorId) -> Result<Doctor, AppError> {
        let doctor = self
            .doctors
            .set_status(id, ApprovalStatus::Approved, None)
            .await?;
        tracing::info!(doctor_id = %id, "Doctor approved");
        Ok(doctor)
    }

    /// Reject a doctor, with an optional reason shown to them
    pub async fn reject_doctor(
        &self,
        id: &DoctorId,
        reason: Option<&str>,
    ) -> Result<Doctor, AppError> {
        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        let doctor = self
            .doctors
            .set_status(id, ApprovalStatus::Rejected, reason)
            .await?;
        tracing::info!(doctor_id = %id, "Doctor rejected");
        Ok(doctor)
    }

    pub async fn stats(&self) -> Result<AdminStats, AppError> {
        Ok(AdminStats {
            doctors_pending: self.doctors.count_by_status(ApprovalStatus::Pending).await?,
            doctors_approved: self.doctors.count_by_status(ApprovalStatus::Approved).await?,
            doctors_rejected: self.doctors.count_by_status(ApprovalStatus::Rejected).await?,
            patients: self.patients.count().await?,
            invites_pending: self.invites.count_by_status(InviteStatus::Pending).await?,
            connections: self.invites.count_by_status(InviteStatus::Accepted).await?,
        })
    }
}
