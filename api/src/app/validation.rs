//! Request field validation
//!
//! Shared checks for the handful of fields the endpoints require.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_INVITE_MESSAGE_LEN: usize = 500;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email regex"))
}

/// Trimmed value, or None when missing or blank
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A required field, with the Italian message to answer when it is missing
pub fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, AppError> {
    non_blank(value).ok_or_else(|| AppError::BadRequest(message.to_string()))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

/// Email and password, both required
pub fn credentials<'a>(
    email: Option<&'a str>,
    password: Option<&'a str>,
) -> Result<(&'a str, &'a str), AppError> {
    let email = non_blank(email);
    // Passwords are not trimmed
    let password = password.filter(|p| !p.is_empty());

    match (email, password) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(AppError::BadRequest(
            "Email e password sono obbligatorie".to_string(),
        )),
    }
}

pub fn validate_new_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "La password deve contenere almeno {} caratteri",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Parse an optional `YYYY-MM-DD` date
pub fn optional_date(value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match non_blank(value) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::BadRequest("Data di nascita non valida (formato AAAA-MM-GG)".to_string())
            }),
    }
}

/// Trim an optional free-text message, enforcing the length cap
pub fn invite_message(value: Option<&str>) -> Result<Option<String>, AppError> {
    match non_blank(value) {
        None => Ok(None),
        Some(msg) if msg.chars().count() > MAX_INVITE_MESSAGE_LEN => Err(AppError::BadRequest(
            format!(
                "Il messaggio non può superare {} caratteri",
                MAX_INVITE_MESSAGE_LEN
            ),
        )),
        Some(msg) => Ok(Some(msg.to_string())),
    }
}
