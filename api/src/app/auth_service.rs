//! Auth service
//!
//! Handles registration, sign-in, session management and user-type
//! resolution. Accounts live in the hosted auth service; the doctor and
//! patient profiles live in the database, keyed by the account id.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{
    credentials, is_valid_email, non_blank, optional_date, required, validate_new_password,
};
use crate::domain::entities::{
    AuthSession, AuthUser, Doctor, DoctorId, NewDoctor, NewPatient, Patient, PatientId, UserRole,
    UserType,
};
use crate::domain::ports::{AuthProvider, DoctorRepository, PatientRepository};
use crate::error::AppError;

/// The profile behind an account
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Account {
    Doctor(Doctor),
    Patient(Patient),
}

impl Account {
    pub fn user_type(&self) -> UserType {
        match self {
            Account::Doctor(doctor) => UserType::Doctor(doctor.status),
            Account::Patient(_) => UserType::Patient,
        }
    }
}

/// Resolve an optional account to its user type
pub fn user_type_of(account: Option<&Account>) -> UserType {
    account.map(Account::user_type).unwrap_or(UserType::Unknown)
}

/// Registration form as submitted by the frontend.
/// Every field is optional so that missing ones get a proper message.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub user_type: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    // Doctors
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    // Patients
    pub fiscal_code: Option<String>,
    pub date_of_birth: Option<String>,
}

/// Outcome of a successful registration
#[derive(Debug, Clone)]
pub struct Registered {
    pub account: Account,
    /// Absent when the email must be confirmed before signing in
    pub session: Option<AuthSession>,
}

/// Outcome of a successful sign-in
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub session: AuthSession,
    pub account: Option<Account>,
}

/// Service for authentication and user-type resolution
pub struct AuthService {
    auth: Arc<dyn AuthProvider>,
    doctors: Arc<dyn DoctorRepository>,
    patients: Arc<dyn PatientRepository>,
}

impl AuthService {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        doctors: Arc<dyn DoctorRepository>,
        patients: Arc<dyn PatientRepository>,
    ) -> Self {
        Self {
            auth,
            doctors,
            patients,
        }
    }

    /// Register a new doctor or patient
    ///
    /// Creates:
    /// 1. The account in the auth service
    /// 2. The doctor (pending approval) or patient profile
    ///
    /// If the profile cannot be stored the account is deleted again.
    pub async fn register(&self, form: &RegistrationForm) -> Result<Registered, AppError> {
        let (email, password) = credentials(form.email.as_deref(), form.password.as_deref())?;
        if !is_valid_email(email) {
            return Err(AppError::BadRequest("Indirizzo email non valido".to_string()));
        }
        validate_new_password(password)?;

        let role: UserRole = required(form.user_type.as_deref(), "Tipo di utente obbligatorio")?
            .parse()
            .map_err(|_| AppError::BadRequest("Tipo di utente non valido".to_string()))?;

        let (first_name, last_name) = match (
            non_blank(form.first_name.as_deref()),
            non_blank(form.last_name.as_deref()),
        ) {
            (Some(first), Some(last)) => (first.to_string(), last.to_string()),
            _ => {
                return Err(AppError::BadRequest(
                    "Nome e cognome sono obbligatori".to_string(),
                ))
            }
        };
        let phone = non_blank(form.phone.as_deref()).map(str::to_string);

        // Validate role-specific fields before touching the auth service
        let profile = match role {
            UserRole::Doctor => {
                match (
                    non_blank(form.specialization.as_deref()),
                    non_blank(form.license_number.as_deref()),
                ) {
                    (Some(specialization), Some(license_number)) => PendingProfile::Doctor {
                        specialization: specialization.to_string(),
                        license_number: license_number.to_string(),
                    },
                    _ => {
                        return Err(AppError::BadRequest(
                            "Specializzazione e numero di iscrizione all'albo sono obbligatori"
                                .to_string(),
                        ))
                    }
                }
            }
            UserRole::Patient => PendingProfile::Patient {
                fiscal_code: non_blank(form.fiscal_code.as_deref()).map(str::to_uppercase),
                date_of_birth: optional_date(form.date_of_birth.as_deref())?,
            },
        };

        let signup = self.auth.sign_up(email, password, role).await?;
        let user_id = signup.user.id;

        let stored = match profile {
            PendingProfile::Doctor {
                specialization,
                license_number,
            } => self
                .doctors
                .create(&NewDoctor {
                    id: DoctorId(user_id),
                    email: email.to_lowercase(),
                    first_name,
                    last_name,
                    specialization,
                    license_number,
                    phone,
                })
                .await
                .map(Account::Doctor),
            PendingProfile::Patient {
                fiscal_code,
                date_of_birth,
            } => self
                .patients
                .create(&NewPatient {
                    id: PatientId(user_id),
                    email: email.to_lowercase(),
                    first_name,
                    last_name,
                    fiscal_code,
                    date_of_birth,
                    phone,
                })
                .await
                .map(Account::Patient),
        };

        match stored {
            Ok(account) => {
                tracing::info!(user_id = %user_id, role = %role, "Registered new account");
                Ok(Registered {
                    account,
                    session: signup.session,
                })
            }
            Err(e) => {
                // Don't leave an account without a profile behind
                if let Err(cleanup) = self.auth.delete_user(user_id).await {
                    tracing::error!(
                        error = %cleanup,
                        user_id = %user_id,
                        "Failed to delete account after profile creation failed"
                    );
                }
                Err(e.into())
            }
        }
    }

    /// Sign in with email and password
    pub async fn login(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<SignedIn, AppError> {
        let (email, password) = credentials(email, password)?;

        let session = self.auth.sign_in_with_password(email, password).await?;
        let account = self.resolve(&session.user.id).await?;

        tracing::debug!(
            user_id = %session.user.id,
            user_type = user_type_of(account.as_ref()).as_str(),
            "User signed in"
        );

        Ok(SignedIn { session, account })
    }

    /// Exchange a refresh token for a fresh session
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<AuthSession, AppError> {
        let refresh_token = required(refresh_token, "Refresh token obbligatorio")?;
        Ok(self.auth.refresh_session(refresh_token).await?)
    }

    /// Revoke the session behind an access token
    pub async fn logout(&self, access_token: &str) -> Result<(), AppError> {
        self.auth.sign_out(access_token).await?;
        Ok(())
    }

    /// Resolve an access token to its user
    pub async fn authenticate(&self, access_token: &str) -> Result<AuthUser, AppError> {
        Ok(self.auth.get_user(access_token).await?)
    }

    /// Find the profile behind an account id. Doctors take precedence.
    pub async fn resolve(&self, user_id: &Uuid) -> Result<Option<Account>, AppError> {
        if let Some(doctor) = self.doctors.find_by_id(&DoctorId(*user_id)).await? {
            return Ok(Some(Account::Doctor(doctor)));
        }

        if let Some(patient) = self.patients.find_by_id(&PatientId(*user_id)).await? {
            return Ok(Some(Account::Patient(patient)));
        }

        Ok(None)
    }

    /// The account of a doctor or patient allowed to use the platform.
    /// Doctors must be approved.
    pub async fn require_account(&self, user: &AuthUser) -> Result<Account, AppError> {
        match self.resolve(&user.id).await? {
            Some(Account::Doctor(doctor)) if !doctor.is_approved() => Err(AppError::WrongArea(
                UserType::Doctor(doctor.status).redirect_path().to_string(),
            )),
            Some(account) => Ok(account),
            None => Err(AppError::Unauthorized),
        }
    }

    /// The caller's profile, if the caller is an approved doctor
    pub async fn require_doctor(&self, user: &AuthUser) -> Result<Doctor, AppError> {
        match self.require_account(user).await? {
            Account::Doctor(doctor) => Ok(doctor),
            other => Err(AppError::WrongArea(
                other.user_type().redirect_path().to_string(),
            )),
        }
    }

    /// The caller's profile, if the caller is a patient
    pub async fn require_patient(&self, user: &AuthUser) -> Result<Patient, AppError> {
        match self.resolve(&user.id).await? {
            Some(Account::Patient(patient)) => Ok(patient),
            Some(other) => Err(AppError::WrongArea(
                other.user_type().redirect_path().to_string(),
            )),
            None => Err(AppError::Unauthorized),
        }
    }
}

/// Role-specific fields, validated but not yet stored
enum PendingProfile {
    Doctor {
        specialization: String,
        license_number: String,
    },
    Patient {
        fiscal_code: Option<String>,
        date_of_birth: Option<chrono::NaiveDate>,
    },
}
