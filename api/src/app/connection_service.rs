//! Connection service
//!
//! Patient-doctor connections. Either side sends an invite; the other side
//! accepts or rejects it. An accepted invite is the connection.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use super::auth_service::Account;
use super::validation::{invite_message, required};
use crate::domain::entities::{
    Doctor, DoctorId, DoctorSearch, Invite, InviteId, InviteSide, InviteStatus, NewInvite,
    Patient, PatientId, DUPLICATE_INVITE,
};
use crate::domain::ports::{DoctorRepository, InviteRepository, PatientRepository};
use crate::error::{AppError, DomainError};

/// Who an invite is addressed to
#[derive(Debug, Clone)]
pub enum InviteTarget {
    /// A patient invites a doctor by id
    Doctor(DoctorId),
    /// A doctor invites a patient by email
    PatientEmail(String),
}

/// An invite with the names of both parties, for listing
#[derive(Debug, Clone, Serialize)]
pub struct InviteDetails {
    #[serde(flatten)]
    pub invite: Invite,
    pub doctor_name: Option<String>,
    pub doctor_specialization: Option<String>,
    pub patient_name: Option<String>,
}

/// Service for patient-doctor connections
pub struct ConnectionService {
    doctors: Arc<dyn DoctorRepository>,
    patients: Arc<dyn PatientRepository>,
    invites: Arc<dyn InviteRepository>,
}

impl ConnectionService {
    pub fn new(
        doctors: Arc<dyn DoctorRepository>,
        patients: Arc<dyn PatientRepository>,
        invites: Arc<dyn InviteRepository>,
    ) -> Self {
        Self {
            doctors,
            patients,
            invites,
        }
    }

    /// Approved doctors matching the search
    pub async fn search_doctors(&self, search: &DoctorSearch) -> Result<Vec<Doctor>, AppError> {
        Ok(self.doctors.search_approved(search).await?)
    }

    /// Patients connected to a doctor
    pub async fn connected_patients(&self, doctor: &Doctor) -> Result<Vec<Patient>, AppError> {
        let ids: Vec<PatientId> = self
            .invites
            .list_for_doctor(&doctor.id, Some(InviteStatus::Accepted))
            .await?
            .into_iter()
            .map(|invite| invite.patient_id)
            .collect();

        Ok(self.patients.find_by_ids(&ids).await?)
    }

    /// Doctors connected to a patient
    pub async fn connected_doctors(&self, patient: &Patient) -> Result<Vec<Doctor>, AppError> {
        let ids: Vec<DoctorId> = self
            .invites
            .list_for_patient(&patient.id, Some(InviteStatus::Accepted))
            .await?
            .into_iter()
            .map(|invite| invite.doctor_id)
            .collect();

        Ok(self.doctors.find_by_ids(&ids).await?)
    }

    /// Invites the account is a party to, newest first
    pub async fn list_invites(
        &self,
        account: &Account,
        status: Option<InviteStatus>,
    ) -> Result<Vec<InviteDetails>, AppError> {
        let invites = match account {
            Account::Doctor(doctor) => self.invites.list_for_doctor(&doctor.id, status).await?,
            Account::Patient(patient) => self.invites.list_for_patient(&patient.id, status).await?,
        };

        self.with_names(invites).await
    }

    /// Send an invite from the account to the target
    pub async fn create_invite(
        &self,
        account: &Account,
        target: InviteTarget,
        message: Option<&str>,
    ) -> Result<Invite, AppError> {
        let message = invite_message(message)?;

        let new_invite = match (account, target) {
            (Account::Patient(patient), InviteTarget::Doctor(doctor_id)) => {
                let doctor = self
                    .doctors
                    .find_by_id(&doctor_id)
                    .await?
                    .filter(Doctor::is_approved)
                    .ok_or_else(|| AppError::NotFound("Medico non trovato".to_string()))?;

                NewInvite {
                    doctor_id: doctor.id,
                    patient_id: patient.id,
                    initiated_by: InviteSide::Patient,
                    message,
                }
            }
            (Account::Doctor(doctor), InviteTarget::PatientEmail(email)) => {
                let email = required(Some(email.as_str()), "Email del paziente obbligatoria")?;
                let patient = self
                    .patients
                    .find_by_email(email)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Paziente non trovato".to_string()))?;

                NewInvite {
                    doctor_id: doctor.id,
                    patient_id: patient.id,
                    initiated_by: InviteSide::Doctor,
                    message,
                }
            }
            (Account::Patient(_), InviteTarget::PatientEmail(_)) => {
                return Err(AppError::BadRequest(
                    "ID del medico obbligatorio".to_string(),
                ))
            }
            (Account::Doctor(_), InviteTarget::Doctor(_)) => {
                return Err(AppError::BadRequest(
                    "Email del paziente obbligatoria".to_string(),
                ))
            }
        };

        if self
            .invites
            .find_open(&new_invite.doctor_id, &new_invite.patient_id)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(DUPLICATE_INVITE.to_string()).into());
        }

        let invite = self.invites.create(&new_invite).await?;
        tracing::info!(
            invite_id = %invite.id,
            doctor_id = %invite.doctor_id,
            patient_id = %invite.patient_id,
            initiated_by = %invite.initiated_by,
            "Invite created"
        );
        Ok(invite)
    }

    /// Accept or reject an invite addressed to the account
    pub async fn respond(
        &self,
        account: &Account,
        id: &InviteId,
        accept: bool,
    ) -> Result<Invite, AppError> {
        let invite = self.party_invite(account, id).await?;

        if side_of(account) != invite.recipient() {
            return Err(AppError::Unauthorized);
        }

        let status = if accept {
            InviteStatus::Accepted
        } else {
            InviteStatus::Rejected
        };
        self.resolve_pending(&invite, status).await
    }

    /// Withdraw an invite the account sent
    pub async fn cancel(&self, account: &Account, id: &InviteId) -> Result<Invite, AppError> {
        let invite = self.party_invite(account, id).await?;

        if side_of(account) != invite.initiated_by {
            return Err(AppError::Unauthorized);
        }

        self.resolve_pending(&invite, InviteStatus::Cancelled).await
    }

    /// Load an invite the account is a party to. Invites of others are
    /// reported as missing.
    async fn party_invite(&self, account: &Account, id: &InviteId) -> Result<Invite, AppError> {
        let not_found = || AppError::NotFound("Invito non trovato".to_string());

        let invite = self.invites.find_by_id(id).await?.ok_or_else(not_found)?;

        let is_party = match account {
            Account::Doctor(doctor) => invite.doctor_id == doctor.id,
            Account::Patient(patient) => invite.patient_id == patient.id,
        };
        if !is_party {
            return Err(not_found());
        }

        Ok(invite)
    }

    async fn resolve_pending(
        &self,
        invite: &Invite,
        status: InviteStatus,
    ) -> Result<Invite, AppError> {
        if invite.status != InviteStatus::Pending {
            return Err(DomainError::Conflict(format!(
                "L'invito è già stato gestito (stato: {})",
                invite.status
            ))
            .into());
        }

        let resolved = self.invites.resolve(&invite.id, status).await?;
        tracing::info!(invite_id = %invite.id, status = %status, "Invite resolved");
        Ok(resolved)
    }

    async fn with_names(&self, invites: Vec<Invite>) -> Result<Vec<InviteDetails>, AppError> {
        let doctor_ids: Vec<DoctorId> = invites
            .iter()
            .map(|i| i.doctor_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let patient_ids: Vec<PatientId> = invites
            .iter()
            .map(|i| i.patient_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let doctors: HashMap<DoctorId, Doctor> = self
            .doctors
            .find_by_ids(&doctor_ids)
            .await?
            .into_iter()
            .map(|d| (d.id, d))
            .collect();
        let patients: HashMap<PatientId, Patient> = self
            .patients
            .find_by_ids(&patient_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(invites
            .into_iter()
            .map(|invite| {
                let doctor = doctors.get(&invite.doctor_id);
                let patient = patients.get(&invite.patient_id);
                InviteDetails {
                    doctor_name: doctor.map(Doctor::full_name),
                    doctor_specialization: doctor.map(|d| d.specialization.clone()),
                    patient_name: patient.map(|p| format!("{} {}", p.first_name, p.last_name)),
                    invite,
                }
            })
            .collect())
    }
}

fn side_of(account: &Account) -> InviteSide {
    match account {
        Account::Doctor(_) => InviteSide::Doctor,
        Account::Patient(_) => InviteSide::Patient,
    }
}
