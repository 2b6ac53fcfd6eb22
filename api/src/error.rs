//! Unified error types for the MedHubb API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core business logic and repository errors
//! - `SupabaseError`: Hosted auth API client errors
//! - `AppError`: Application layer errors (wraps the others for HTTP responses)
//!
//! Handlers only ever answer with 400, 401, 404 or 500. User-facing
//! messages are in Italian.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Entity already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Hosted auth API client errors
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Not configured: {0}")]
    NotConfigured(&'static str),
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Auth service error: {0}")]
    Supabase(#[from] SupabaseError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but the account cannot use this area yet.
    /// Carries the path the frontend should send the user to.
    #[error("Wrong area, redirect to {0}")]
    WrongArea(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            AppError::Domain(e) => match e {
                DomainError::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, "Risorsa non trovata", Some(msg.clone()))
                }
                DomainError::AlreadyExists(msg) => {
                    (StatusCode::BAD_REQUEST, "Risorsa già esistente", Some(msg.clone()))
                }
                DomainError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "Dati non validi", Some(msg.clone()))
                }
                DomainError::Conflict(msg) => {
                    (StatusCode::BAD_REQUEST, "Operazione non consentita", Some(msg.clone()))
                }
                DomainError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "Non autorizzato", Some(msg.clone()))
                }
                DomainError::Database(msg) => {
                    tracing::error!("Database error: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Errore del database",
                        Some(msg.clone()),
                    )
                }
                DomainError::Internal(msg) => {
                    tracing::error!("Internal error: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Errore interno del server",
                        None,
                    )
                }
            },
            AppError::Supabase(e) => match e {
                SupabaseError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "Credenziali non valide", None)
                }
                SupabaseError::InvalidToken => {
                    (StatusCode::UNAUTHORIZED, "Sessione non valida o scaduta", None)
                }
                SupabaseError::Api { status, message } => {
                    // The auth service answers 4xx for input it refuses
                    // (weak password, email already registered, ...)
                    if (400..500).contains(status) {
                        (
                            StatusCode::BAD_REQUEST,
                            "Richiesta rifiutata dal servizio di autenticazione",
                            Some(message.clone()),
                        )
                    } else {
                        tracing::error!("Auth service error: {} - {}", status, message);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "Errore del servizio di autenticazione",
                            Some(message.clone()),
                        )
                    }
                }
                SupabaseError::Request(_)
                | SupabaseError::Deserialization(_)
                | SupabaseError::NotConfigured(_) => {
                    tracing::error!("Auth service error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Errore del servizio di autenticazione",
                        Some(e.to_string()),
                    )
                }
            },
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "Richiesta non valida",
                Some(msg.clone()),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Non autorizzato", None),
            AppError::WrongArea(redirect) => {
                (StatusCode::UNAUTHORIZED, "Non autorizzato", Some(redirect.clone()))
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Non trovato", Some(msg.clone())),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Errore interno del server",
                    None,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = self.parts();

        // Validation and not-found errors carry a complete Italian sentence
        // as their payload; surface it as the headline.
        let (error, details) = match (&self, details) {
            (AppError::BadRequest(_), Some(msg))
            | (AppError::NotFound(_), Some(msg))
            | (AppError::Domain(DomainError::NotFound(_)), Some(msg))
            | (AppError::Domain(DomainError::Validation(_)), Some(msg))
            | (AppError::Domain(DomainError::Conflict(_)), Some(msg))
            | (AppError::Domain(DomainError::AlreadyExists(_)), Some(msg)) => (msg, None),
            (_, details) => (error.to_string(), details),
        };

        let body = Json(ErrorResponse { error, details });

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!(
            "Corpo della richiesta non valido: {}",
            rejection.body_text()
        ))
    }
}
