//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod admin;
pub mod auth;
pub mod connections;
pub mod dashboard;

use uuid::Uuid;

use crate::error::AppError;

pub use admin::{
    admin_login, admin_stats, approve_doctor, list_doctors as admin_list_doctors, reject_doctor,
};
pub use auth::{login, logout, me, redirect, refresh, register};
pub use connections::{
    cancel_invite, create_invite, list_doctors, list_invites, list_patients, respond_invite,
};
pub use dashboard::{doctor_dashboard, patient_dashboard};

/// Parse an id taken from the URL path
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest("ID non valido".to_string()))
}

/// Parse an optional `?status=` filter, treating an empty value as absent
pub(crate) fn parse_status<T: std::str::FromStr>(raw: Option<&str>) -> Result<Option<T>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Stato non valido: {}", raw))),
        None => Ok(None),
    }
}
