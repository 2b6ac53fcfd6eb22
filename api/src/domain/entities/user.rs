//! Authenticated users and user-type resolution
//!
//! Every account lives in the hosted auth service. Whether the account is a
//! doctor or a patient is decided by which profile table holds its id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApprovalStatus;

pub const LOGIN_PATH: &str = "/login";
pub const DOCTOR_DASHBOARD_PATH: &str = "/dashboard/doctor";
pub const PATIENT_DASHBOARD_PATH: &str = "/dashboard/patient";
pub const ADMIN_DASHBOARD_PATH: &str = "/dashboard/admin";
pub const PENDING_APPROVAL_PATH: &str = "/pending-approval";
pub const ACCOUNT_REJECTED_PATH: &str = "/account-rejected";

/// A user as known by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Tokens issued by the auth service after a successful sign-in
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
    pub user: AuthUser,
}

/// Result of creating an account. The session is absent when the auth
/// service requires email confirmation before the first sign-in.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

/// The role chosen at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Doctor,
    Patient,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Doctor => write!(f, "doctor"),
            UserRole::Patient => write!(f, "patient"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "doctor" | "medico" => Ok(UserRole::Doctor),
            "patient" | "paziente" => Ok(UserRole::Patient),
            _ => Err(format!("Unknown user type: {}", s)),
        }
    }
}

/// What kind of user an account resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Doctor(ApprovalStatus),
    Patient,
    Admin,
    /// Authenticated, but neither profile table knows the id
    Unknown,
}

impl UserType {
    /// Name used in JSON responses
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Doctor(_) => "doctor",
            UserType::Patient => "patient",
            UserType::Admin => "admin",
            UserType::Unknown => "unknown",
        }
    }

    /// Approval status, for doctors only
    pub fn doctor_status(&self) -> Option<ApprovalStatus> {
        match self {
            UserType::Doctor(status) => Some(*status),
            _ => None,
        }
    }

    /// The page this user lands on after signing in
    pub fn redirect_path(&self) -> &'static str {
        match self {
            UserType::Doctor(ApprovalStatus::Approved) => DOCTOR_DASHBOARD_PATH,
            UserType::Doctor(ApprovalStatus::Pending) => PENDING_APPROVAL_PATH,
            UserType::Doctor(ApprovalStatus::Rejected) => ACCOUNT_REJECTED_PATH,
            UserType::Patient => PATIENT_DASHBOARD_PATH,
            UserType::Admin => ADMIN_DASHBOARD_PATH,
            UserType::Unknown => LOGIN_PATH,
        }
    }
}

/// Decide where the auth redirect page sends the browser.
///
/// Without a resolved user the target is the login page, carrying `next`
/// along so the user comes back after signing in. With a user, `next` is
/// honored only when it is a local path inside that user's own area.
pub fn redirect_target(user_type: Option<UserType>, next: Option<&str>) -> String {
    let next = next.filter(|n| is_local_path(n));

    match user_type {
        None => match next {
            Some(next) => format!("{}?next={}", LOGIN_PATH, urlencoding::encode(next)),
            None => LOGIN_PATH.to_string(),
        },
        Some(user_type) => {
            let home = user_type.redirect_path();
            match next {
                Some(next) if home.starts_with("/dashboard/") && is_within(next, home) => {
                    next.to_string()
                }
                _ => home.to_string(),
            }
        }
    }
}

/// Reject absolute and protocol-relative URLs, and paths a browser would
/// resolve upwards
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !has_dot_segment(path)
}

fn has_dot_segment(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').any(|segment| {
        matches!(
            segment.to_ascii_lowercase().as_str(),
            ".." | ".%2e" | "%2e." | "%2e%2e"
        )
    })
}

fn is_within(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_paths_per_user_type() {
        assert_eq!(
            UserType::Doctor(ApprovalStatus::Approved).redirect_path(),
            "/dashboard/doctor"
        );
        assert_eq!(
            UserType::Doctor(ApprovalStatus::Pending).redirect_path(),
            "/pending-approval"
        );
        assert_eq!(
            UserType::Doctor(ApprovalStatus::Rejected).redirect_path(),
            "/account-rejected"
        );
        assert_eq!(UserType::Patient.redirect_path(), "/dashboard/patient");
        assert_eq!(UserType::Admin.redirect_path(), "/dashboard/admin");
        assert_eq!(UserType::Unknown.redirect_path(), "/login");
    }

    #[test]
    fn anonymous_goes_to_login_with_next() {
        assert_eq!(redirect_target(None, None), "/login");
        assert_eq!(
            redirect_target(None, Some("/dashboard/patient/doctors")),
            "/login?next=%2Fdashboard%2Fpatient%2Fdoctors"
        );
    }

    #[test]
    fn external_next_is_dropped() {
        assert_eq!(redirect_target(None, Some("https://evil.example")), "/login");
        assert_eq!(redirect_target(None, Some("//evil.example")), "/login");
        assert_eq!(
            redirect_target(Some(UserType::Patient), Some("//evil.example")),
            "/dashboard/patient"
        );
    }

    #[test]
    fn next_inside_own_area_is_kept() {
        assert_eq!(
            redirect_target(Some(UserType::Patient), Some("/dashboard/patient/invites")),
            "/dashboard/patient/invites"
        );
        assert_eq!(
            redirect_target(
                Some(UserType::Doctor(ApprovalStatus::Approved)),
                Some("/dashboard/doctor?tab=patients")
            ),
            "/dashboard/doctor?tab=patients"
        );
    }

    #[test]
    fn next_outside_own_area_is_ignored() {
        assert_eq!(
            redirect_target(Some(UserType::Patient), Some("/dashboard/doctor")),
            "/dashboard/patient"
        );
        assert_eq!(
            redirect_target(Some(UserType::Patient), Some("/dashboard/patientx")),
            "/dashboard/patient"
        );
        assert_eq!(
            redirect_target(Some(UserType::Patient), Some("/dashboard/patient/../admin")),
            "/dashboard/patient"
        );
        assert_eq!(
            redirect_target(Some(UserType::Patient), Some("/dashboard/patient/%2E%2E/admin")),
            "/dashboard/patient"
        );
        assert_eq!(
            redirect_target(Some(UserType::Patient), Some("/dashboard/patient/visite?from=..")),
            "/dashboard/patient/visite?from=.."
        );
    }

    #[test]
    fn pending_doctor_always_lands_on_pending_page() {
        assert_eq!(
            redirect_target(
                Some(UserType::Doctor(ApprovalStatus::Pending)),
                Some("/dashboard/doctor")
            ),
            "/pending-approval"
        );
    }

    #[test]
    fn user_role_accepts_italian_names() {
        assert_eq!("medico".parse::<UserRole>().unwrap(), UserRole::Doctor);
        assert_eq!("Paziente".parse::<UserRole>().unwrap(), UserRole::Patient);
        assert_eq!("patient".parse::<UserRole>().unwrap(), UserRole::Patient);
        assert!("nurse".parse::<UserRole>().is_err());
    }
}
