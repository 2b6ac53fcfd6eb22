//! Doctor domain entity
//!
//! A doctor registers like any other user but can only use the platform
//! once an administrator has approved the account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a doctor (same value as the auth user id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoctorId(pub Uuid);

impl From<Uuid> for DoctorId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DoctorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a doctor account is in the approval workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            _ => Err(format!("Unknown approval status: {}", s)),
        }
    }
}

/// A doctor profile
#[derive(Debug, Clone, Serialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    /// Medical board registration number
    pub license_number: String,
    pub phone: Option<String>,
    pub status: ApprovalStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    /// When an administrator last approved or rejected the account
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Doctor {
    pub fn is_approved(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Data needed to create a doctor profile
#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub id: DoctorId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub license_number: String,
    pub phone: Option<String>,
}

/// Filter for the public doctor directory
#[derive(Debug, Clone, Default)]
pub struct DoctorSearch {
    /// Matched case-insensitively against first and last name
    pub search: Option<String>,
    pub specialization: Option<String>,
}
