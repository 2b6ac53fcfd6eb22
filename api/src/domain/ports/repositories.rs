//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;

use crate::domain::entities::{
    ApprovalStatus, Doctor, DoctorId, DoctorSearch, Invite, InviteId, InviteStatus, NewDoctor,
    NewInvite, NewPatient, Patient, PatientId,
};
use crate::error::DomainError;

/// Repository for Doctor profiles
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    /// Find a doctor by ID
    async fn find_by_id(&self, id: &DoctorId) -> Result<Option<Doctor>, DomainError>;

    /// Find a doctor by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<Doctor>, DomainError>;

    /// Find several doctors at once, ordered by last name then first name
    async fn find_by_ids(&self, ids: &[DoctorId]) -> Result<Vec<Doctor>, DomainError>;

    /// Create a doctor profile. New profiles always start pending.
    async fn create(&self, doctor: &NewDoctor) -> Result<Doctor, DomainError>;

    /// List doctors, optionally filtered by status, newest first
    async fn list_by_status(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<Doctor>, DomainError>;

    /// Approved doctors matching the search, ordered by last name then first name
    async fn search_approved(&self, search: &DoctorSearch) -> Result<Vec<Doctor>, DomainError>;

    /// Record an approval decision. Fails with NotFound for an unknown id.
    async fn set_status(
        &self,
        id: &DoctorId,
        status: ApprovalStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Doctor, DomainError>;

    /// Count doctors with the given status
    async fn count_by_status(&self, status: ApprovalStatus) -> Result<u64, DomainError>;
}

/// Repository for Patient profiles
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Find a patient by ID
    async fn find_by_id(&self, id: &PatientId) -> Result<Option<Patient>, DomainError>;

    /// Find a patient by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, DomainError>;

    /// Find several patients at once, ordered by last name then first name
    async fn find_by_ids(&self, ids: &[PatientId]) -> Result<Vec<Patient>, DomainError>;

    /// Create a patient profile
    async fn create(&self, patient: &NewPatient) -> Result<Patient, DomainError>;

    /// Count all patients
    async fn count(&self) -> Result<u64, DomainError>;
}

/// Repository for doctor-patient invites
#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Create a pending invite
    async fn create(&self, invite: &NewInvite) -> Result<Invite, DomainError>;

    /// Find an invite by ID
    async fn find_by_id(&self, id: &InviteId) -> Result<Option<Invite>, DomainError>;

    /// Find the pending or accepted invite for a doctor/patient pair, if any
    async fn find_open(
        &self,
        doctor_id: &DoctorId,
        patient_id: &PatientId,
    ) -> Result<Option<Invite>, DomainError>;

    /// Invites involving a doctor, newest first
    async fn list_for_doctor(
        &self,
        doctor_id: &DoctorId,
        status: Option<InviteStatus>,
    ) -> Result<Vec<Invite>, DomainError>;

    /// Invites involving a patient, newest first
    async fn list_for_patient(
        &self,
        patient_id: &PatientId,
        status: Option<InviteStatus>,
    ) -> Result<Vec<Invite>, DomainError>;

    /// Move a pending invite to a final status and stamp `responded_at`.
    ///
    /// Fails with Conflict when the invite is no longer pending, so two
    /// concurrent responses cannot both succeed.
    async fn resolve(&self, id: &InviteId, status: InviteStatus) -> Result<Invite, DomainError>;

    /// Count invites with the given status
    async fn count_by_status(&self, status: InviteStatus) -> Result<u64, DomainError>;
}
