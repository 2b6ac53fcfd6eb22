//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod postgres;
pub mod supabase;

pub use postgres::{PostgresDoctorRepository, PostgresInviteRepository, PostgresPatientRepository};
pub use supabase::SupabaseAuthClient;
