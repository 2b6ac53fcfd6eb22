//! Invite domain entity
//!
//! An invite is a connection request between a doctor and a patient.
//! Either side may start it; the other side accepts or rejects it.
//! An accepted invite is the connection itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DoctorId, PatientId};

/// Answer when a pair already has an open invite
pub const DUPLICATE_INVITE: &str = "Esiste già un invito per questo collegamento";

/// Unique identifier for an invite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InviteId(pub Uuid);

impl InviteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InviteId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for InviteId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for InviteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the connection sent the invite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteSide {
    Doctor,
    Patient,
}

impl std::fmt::Display for InviteSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InviteSide::Doctor => write!(f, "doctor"),
            InviteSide::Patient => write!(f, "patient"),
        }
    }
}

impl std::str::FromStr for InviteSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "doctor" => Ok(InviteSide::Doctor),
            "patient" => Ok(InviteSide::Patient),
            _ => Err(format!("Unknown invite side: {}", s)),
        }
    }
}

/// Invite lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl InviteStatus {
    /// Pending and accepted invites block a new invite for the same pair
    pub fn is_open(&self) -> bool {
        matches!(self, InviteStatus::Pending | InviteStatus::Accepted)
    }
}

impl std::fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InviteStatus::Pending => write!(f, "pending"),
            InviteStatus::Accepted => write!(f, "accepted"),
            InviteStatus::Rejected => write!(f, "rejected"),
            InviteStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for InviteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(InviteStatus::Pending),
            "accepted" => Ok(InviteStatus::Accepted),
            "rejected" => Ok(InviteStatus::Rejected),
            "cancelled" => Ok(InviteStatus::Cancelled),
            _ => Err(format!("Unknown invite status: {}", s)),
        }
    }
}

/// A connection request between a doctor and a patient
#[derive(Debug, Clone, Serialize)]
pub struct Invite {
    pub id: InviteId,
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub initiated_by: InviteSide,
    pub status: InviteStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl Invite {
    /// The side expected to accept or reject
    pub fn recipient(&self) -> InviteSide {
        match self.initiated_by {
            InviteSide::Doctor => InviteSide::Patient,
            InviteSide::Patient => InviteSide::Doctor,
        }
    }
}

/// Data needed to create an invite
#[derive(Debug, Clone)]
pub struct NewInvite {
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub initiated_by: InviteSide,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_and_accepted_are_open() {
        assert!(InviteStatus::Pending.is_open());
        assert!(InviteStatus::Accepted.is_open());
        assert!(!InviteStatus::Rejected.is_open());
        assert!(!InviteStatus::Cancelled.is_open());
    }

    #[test]
    fn recipient_is_the_other_side() {
        let invite = Invite {
            id: InviteId::new(),
            doctor_id: DoctorId(Uuid::new_v4()),
            patient_id: PatientId(Uuid::new_v4()),
            initiated_by: InviteSide::Patient,
            status: InviteStatus::Pending,
            message: None,
            created_at: Utc::now(),
            responded_at: None,
        };
        assert_eq!(invite.recipient(), InviteSide::Doctor);
    }

    #[test]
    fn invite_status_parse() {
        assert_eq!(
            "Cancelled".parse::<InviteStatus>().unwrap(),
            InviteStatus::Cancelled
        );
        assert!("expired".parse::<InviteStatus>().is_err());
    }
}
