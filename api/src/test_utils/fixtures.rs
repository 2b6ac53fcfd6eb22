//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::entities::{ApprovalStatus, Doctor, DoctorId, Patient, PatientId};

/// Create a test doctor with the given approval status
pub fn test_doctor(status: ApprovalStatus) -> Doctor {
    test_doctor_named("Giulia", "Verdi", status)
}

/// Create a test doctor with a specific name
pub fn test_doctor_named(first_name: &str, last_name: &str, status: ApprovalStatus) -> Doctor {
    let id = Uuid::new_v4();
    Doctor {
        id: DoctorId(id),
        // Unique per doctor so several can share a repository
        email: format!(
            "{}.{}.{}@ospedale.it",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            &id.simple().to_string()[..8]
        ),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        specialization: "Cardiologia".to_string(),
        license_number: "RM-12345".to_string(),
        phone: None,
        status,
        rejection_reason: None,
        created_at: Utc::now(),
        reviewed_at: if status == ApprovalStatus::Pending {
            None
        } else {
            Some(Utc::now())
        },
    }
}

/// Create a test patient with default values
pub fn test_patient() -> Patient {
    test_patient_named("Marco", "Bianchi")
}

/// Create a test patient with a specific name
pub fn test_patient_named(first_name: &str, last_name: &str) -> Patient {
    let id = Uuid::new_v4();
    Patient {
        id: PatientId(id),
        email: format!(
            "{}.{}.{}@example.it",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            &id.simple().to_string()[..8]
        ),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        fiscal_code: Some("BNCMRC80A01H501U".to_string()),
        date_of_birth: NaiveDate::from_ymd_opt(1980, 1, 1),
        phone: Some("+39 333 1234567".to_string()),
        created_at: Utc::now(),
    }
}
