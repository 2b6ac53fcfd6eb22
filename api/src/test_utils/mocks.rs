//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::domain::entities::{
    ApprovalStatus, AuthSession, AuthUser, Doctor, DoctorId, DoctorSearch, Invite, InviteId,
    InviteStatus, NewDoctor, NewInvite, NewPatient, Patient, PatientId, SignUp, UserRole,
    DUPLICATE_INVITE,
};
use crate::domain::ports::{AuthProvider, DoctorRepository, InviteRepository, PatientRepository};
use crate::error::{DomainError, SupabaseError};

fn unavailable() -> DomainError {
    DomainError::Database("database unavailable".to_string())
}

// ============================================================================
// In-Memory Doctor Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryDoctorRepository {
    doctors: Arc<RwLock<HashMap<DoctorId, Doctor>>>,
    should_fail: bool,
}

impl InMemoryDoctorRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a database error
    pub fn failing(self) -> Self {
        Self {
            should_fail: true,
            ..self
        }
    }

    /// Pre-populate with a doctor for testing
    pub fn with_doctor(self, doctor: Doctor) -> Self {
        self.doctors.write().unwrap().insert(doctor.id, doctor);
        self
    }

    pub fn len(&self) -> usize {
        self.doctors.read().unwrap().len()
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.should_fail {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

fn by_name(a: &Doctor, b: &Doctor) -> std::cmp::Ordering {
    a.last_name
        .cmp(&b.last_name)
        .then_with(|| a.first_name.cmp(&b.first_name))
}

#[async_trait]
impl DoctorRepository for InMemoryDoctorRepository {
    async fn find_by_id(&self, id: &DoctorId) -> Result<Option<Doctor>, DomainError> {
        self.check()?;
        Ok(self.doctors.read().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Doctor>, DomainError> {
        self.check()?;
        let email = email.trim().to_lowercase();
        let doctors = self.doctors.read().unwrap();
        Ok(doctors.values().find(|d| d.email == email).cloned())
    }

    async fn find_by_ids(&self, ids: &[DoctorId]) -> Result<Vec<Doctor>, DomainError> {
        self.check()?;
        let doctors = self.doctors.read().unwrap();
        let mut found: Vec<Doctor> = ids.iter().filter_map(|id| doctors.get(id).cloned()).collect();
        found.sort_by(by_name);
        Ok(found)
    }

    async fn create(&self, new_doctor: &NewDoctor) -> Result<Doctor, DomainError> {
        self.check()?;
        let mut doctors = self.doctors.write().unwrap();
        let email = new_doctor.email.trim().to_lowercase();
        if doctors.contains_key(&new_doctor.id) || doctors.values().any(|d| d.email == email) {
            return Err(DomainError::AlreadyExists(format!("Doctor {}", email)));
        }

        let doctor = Doctor {
            id: new_doctor.id,
            email,
            first_name: new_doctor.first_name.clone(),
            last_name: new_doctor.last_name.clone(),
            specialization: new_doctor.specialization.clone(),
            license_number: new_doctor.license_number.clone(),
            phone: new_doctor.phone.clone(),
            status: ApprovalStatus::Pending,
            rejection_reason: None,
            created_at: Utc::now(),
            reviewed_at: None,
        };
        doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    async fn list_by_status(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<Doctor>, DomainError> {
        self.check()?;
        let doctors = self.doctors.read().unwrap();
        let mut listed: Vec<Doctor> = doctors
            .values()
            .filter(|d| status.map_or(true, |s| d.status == s))
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn search_approved(&self, search: &DoctorSearch) -> Result<Vec<Doctor>, DomainError> {
        self.check()?;
        let term = search
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let specialization = search
            .specialization
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let doctors = self.doctors.read().unwrap();
        let mut found: Vec<Doctor> = doctors
            .values()
            .filter(|d| d.is_approved())
            .filter(|d| {
                term.as_ref().map_or(true, |t| {
                    d.first_name.to_lowercase().contains(t)
                        || d.last_name.to_lowercase().contains(t)
                })
            })
            .filter(|d| {
                specialization
                    .as_ref()
                    .map_or(true, |s| d.specialization.to_lowercase() == *s)
            })
            .cloned()
            .collect();
        found.sort_by(by_name);
        Ok(found)
    }

    async fn set_status(
        &self,
        id: &DoctorId,
        status: ApprovalStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Doctor, DomainError> {
        self.check()?;
        let mut doctors = self.doctors.write().unwrap();
        let doctor = doctors
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound("Medico non trovato".to_string()))?;

        doctor.status = status;
        doctor.rejection_reason = rejection_reason.map(str::to_string);
        doctor.reviewed_at = Some(Utc::now());
        Ok(doctor.clone())
    }

    async fn count_by_status(&self, status: ApprovalStatus) -> Result<u64, DomainError> {
        self.check()?;
        let doctors = self.doctors.read().unwrap();
        Ok(doctors.values().filter(|d| d.status == status).count() as u64)
    }
}

// ============================================================================
// In-Memory Patient Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryPatientRepository {
    patients: Arc<RwLock<HashMap<PatientId, Patient>>>,
    should_fail: bool,
}

impl InMemoryPatientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a database error
    pub fn failing(self) -> Self {
        Self {
            should_fail: true,
            ..self
        }
    }

    /// Pre-populate with a patient for testing
    pub fn with_patient(self, patient: Patient) -> Self {
        self.patients.write().unwrap().insert(patient.id, patient);
        self
    }

    pub fn len(&self) -> usize {
        self.patients.read().unwrap().len()
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.should_fail {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PatientRepository for InMemoryPatientRepository {
    async fn find_by_id(&self, id: &PatientId) -> Result<Option<Patient>, DomainError> {
        self.check()?;
        Ok(self.patients.read().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, DomainError> {
        self.check()?;
        let email = email.trim().to_lowercase();
        let patients = self.patients.read().unwrap();
        Ok(patients
            .values()
            .find(|p| p.email.to_lowercase() == email)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[PatientId]) -> Result<Vec<Patient>, DomainError> {
        self.check()?;
        let patients = self.patients.read().unwrap();
        let mut found: Vec<Patient> = ids
            .iter()
            .filter_map(|id| patients.get(id).cloned())
            .collect();
        found.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        Ok(found)
    }

    async fn create(&self, new_patient: &NewPatient) -> Result<Patient, DomainError> {
        self.check()?;
        let mut patients = self.patients.write().unwrap();
        let email = new_patient.email.trim().to_lowercase();
        if patients.contains_key(&new_patient.id) || patients.values().any(|p| p.email == email) {
            return Err(DomainError::AlreadyExists(format!("Patient {}", email)));
        }

        let patient = Patient {
            id: new_patient.id,
            email,
            first_name: new_patient.first_name.clone(),
            last_name: new_patient.last_name.clone(),
            fiscal_code: new_patient.fiscal_code.as_ref().map(|c| c.to_uppercase()),
            date_of_birth: new_patient.date_of_birth,
            phone: new_patient.phone.clone(),
            created_at: Utc::now(),
        };
        patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    async fn count(&self) -> Result<u64, DomainError> {
        self.check()?;
        Ok(self.patients.read().unwrap().len() as u64)
    }
}

// ============================================================================
// In-Memory Invite Repository
// ============================================================================

#[derive(Default)]
pub struct InMemoryInviteRepository {
    invites: Arc<RwLock<HashMap<InviteId, Invite>>>,
}

impl InMemoryInviteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with an invite for testing
    pub fn with_invite(self, invite: Invite) -> Self {
        self.invites.write().unwrap().insert(invite.id, invite);
        self
    }

    pub fn len(&self) -> usize {
        self.invites.read().unwrap().len()
    }

    fn list_where(&self, keep: impl Fn(&Invite) -> bool) -> Vec<Invite> {
        let invites = self.invites.read().unwrap();
        let mut listed: Vec<Invite> = invites.values().filter(|i| keep(i)).cloned().collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        listed
    }
}

#[async_trait]
impl InviteRepository for InMemoryInviteRepository {
    async fn create(&self, new_invite: &NewInvite) -> Result<Invite, DomainError> {
        let invite = Invite {
            id: InviteId::new(),
            doctor_id: new_invite.doctor_id,
            patient_id: new_invite.patient_id,
            initiated_by: new_invite.initiated_by,
            status: InviteStatus::Pending,
            message: new_invite.message.clone(),
            created_at: Utc::now(),
            responded_at: None,
        };
        let mut invites = self.invites.write().unwrap();
        // Same rule as the open-pair unique index
        if invites.values().any(|i| {
            i.doctor_id == invite.doctor_id
                && i.patient_id == invite.patient_id
                && i.status.is_open()
        }) {
            return Err(DomainError::Conflict(DUPLICATE_INVITE.to_string()));
        }
        invites.insert(invite.id, invite.clone());
        Ok(invite)
    }

    async fn find_by_id(&self, id: &InviteId) -> Result<Option<Invite>, DomainError> {
        Ok(self.invites.read().unwrap().get(id).cloned())
    }

    async fn find_open(
        &self,
        doctor_id: &DoctorId,
        patient_id: &PatientId,
    ) -> Result<Option<Invite>, DomainError> {
        let invites = self.invites.read().unwrap();
        Ok(invites
            .values()
            .find(|i| {
                i.doctor_id == *doctor_id && i.patient_id == *patient_id && i.status.is_open()
            })
            .cloned())
    }

    async fn list_for_doctor(
        &self,
        doctor_id: &DoctorId,
        status: Option<InviteStatus>,
    ) -> Result<Vec<Invite>, DomainError> {
        Ok(self.list_where(|i| {
            i.doctor_id == *doctor_id && status.map_or(true, |s| i.status == s)
        }))
    }

    async fn list_for_patient(
        &self,
        patient_id: &PatientId,
        status: Option<InviteStatus>,
    ) -> Result<Vec<Invite>, DomainError> {
        Ok(self.list_where(|i| {
            i.patient_id == *patient_id && status.map_or(true, |s| i.status == s)
        }))
    }

    async fn resolve(&self, id: &InviteId, status: InviteStatus) -> Result<Invite, DomainError> {
        let mut invites = self.invites.write().unwrap();
        let invite = invites
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound("Invito non trovato".to_string()))?;

        if invite.status != InviteStatus::Pending {
            return Err(DomainError::Conflict(format!(
                "L'invito è già stato gestito (stato: {})",
                invite.status
            )));
        }

        invite.status = status;
        invite.responded_at = Some(Utc::now());
        Ok(invite.clone())
    }

    async fn count_by_status(&self, status: InviteStatus) -> Result<u64, DomainError> {
        let invites = self.invites.read().unwrap();
        Ok(invites.values().filter(|i| i.status == status).count() as u64)
    }
}

// ============================================================================
// Mock Auth Provider
// ============================================================================

#[derive(Debug, Clone)]
struct MockUser {
    id: Uuid,
    email: String,
    password: String,
}

/// Accounts kept in memory. Access tokens are `token-<user id>`,
/// refresh tokens `refresh-<user id>`.
#[derive(Default)]
pub struct MockAuthProvider {
    users: Arc<RwLock<HashMap<String, MockUser>>>,
    revoked: Arc<RwLock<HashSet<String>>>,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with an account for testing
    pub fn with_user(self, id: Uuid, email: &str, password: &str) -> Self {
        self.users.write().unwrap().insert(
            email.to_lowercase(),
            MockUser {
                id,
                email: email.to_lowercase(),
                password: password.to_string(),
            },
        );
        self
    }

    /// The access token this provider issues for a user
    pub fn token_for(id: Uuid) -> String {
        format!("token-{}", id)
    }

    pub fn user_count(&self) -> usize {
        self.users.read().unwrap().len()
    }

    fn session(user: &MockUser) -> AuthSession {
        AuthSession {
            access_token: Self::token_for(user.id),
            refresh_token: format!("refresh-{}", user.id),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            user: AuthUser {
                id: user.id,
                email: user.email.clone(),
            },
        }
    }

    fn user_by_id(&self, id: &str) -> Option<MockUser> {
        let id = Uuid::parse_str(id).ok()?;
        let users = self.users.read().unwrap();
        users.values().find(|u| u.id == id).cloned()
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let users = self.users.read().unwrap();
        match users.get(&email.trim().to_lowercase()) {
            Some(user) if user.password == password => Ok(Self::session(user)),
            _ => Err(SupabaseError::InvalidCredentials),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, SupabaseError> {
        refresh_token
            .strip_prefix("refresh-")
            .and_then(|id| self.user_by_id(id))
            .map(|user| Self::session(&user))
            .ok_or(SupabaseError::InvalidToken)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _role: UserRole,
    ) -> Result<SignUp, SupabaseError> {
        let email = email.trim().to_lowercase();
        let mut users = self.users.write().unwrap();
        if users.contains_key(&email) {
            return Err(SupabaseError::Api {
                status: 422,
                message: "User already registered".to_string(),
            });
        }

        let user = MockUser {
            id: Uuid::new_v4(),
            email: email.clone(),
            password: password.to_string(),
        };
        users.insert(email, user.clone());

        let session = Self::session(&user);
        Ok(SignUp {
            user: session.user.clone(),
            session: Some(session),
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        self.revoked
            .write()
            .unwrap()
            .insert(access_token.to_string());
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        if self.revoked.read().unwrap().contains(access_token) {
            return Err(SupabaseError::InvalidToken);
        }

        access_token
            .strip_prefix("token-")
            .and_then(|id| self.user_by_id(id))
            .map(|user| AuthUser {
                id: user.id,
                email: user.email,
            })
            .ok_or(SupabaseError::InvalidToken)
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), SupabaseError> {
        self.users.write().unwrap().retain(|_, u| u.id != id);
        Ok(())
    }
}
