//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod auth;
pub mod repositories;

pub use auth::AuthProvider;
pub use repositories::{DoctorRepository, InviteRepository, PatientRepository};
