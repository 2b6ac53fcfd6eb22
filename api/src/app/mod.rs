//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and external systems.

pub mod admin_service;
pub mod auth_service;
pub mod connection_service;
pub mod validation;

pub use admin_service::{AdminService, AdminStats};
pub use auth_service::{user_type_of, Account, AuthService, RegistrationForm};
pub use connection_service::{ConnectionService, InviteDetails, InviteTarget};
