//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod doctor_repo;
pub mod invite_repo;
pub mod patient_repo;


pub use doctor_repo::PostgresDoctorRepository;
pub use invite_repo::PostgresInviteRepository;
pub use patient_repo::PostgresPatientRepository;

/// Build a lowercase `LIKE` pattern matching `term` anywhere.
/// Wildcards typed by the user are dropped rather than honored.
pub(crate) fn like_pattern(term: &str) -> String {
    let cleaned: String = term
        .trim()
        .chars()
        .filter(|c| !matches!(c, '%' | '_' | '\\'))
        .collect();
    format!("%{}%", cleaned.to_lowercase())
}
