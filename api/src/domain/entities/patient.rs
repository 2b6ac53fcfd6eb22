//! Patient domain entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a patient (same value as the auth user id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(pub Uuid);

impl From<Uuid> for PatientId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PatientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A patient profile
#[derive(Debug, Clone, Serialize)]
pub struct Patient {
    pub id: PatientId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Italian tax code, stored uppercase
    pub fiscal_code: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data needed to create a patient profile
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub id: PatientId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub fiscal_code: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub phone: Option<String>,
}
