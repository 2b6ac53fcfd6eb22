//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod doctor;
pub mod invite;
pub mod patient;
pub mod user;

pub use doctor::{ApprovalStatus, Doctor, DoctorId, DoctorSearch, NewDoctor};
pub use invite::{Invite, InviteId, InviteSide, InviteStatus, NewInvite, DUPLICATE_INVITE};
pub use patient::{NewPatient, Patient, PatientId};
#[allow(unused_imports)]
pub use user::{
    redirect_target, AuthSession, AuthUser, SignUp, UserRole, UserType, ACCOUNT_REJECTED_PATH,
    ADMIN_DASHBOARD_PATH, DOCTOR_DASHBOARD_PATH, LOGIN_PATH, PATIENT_DASHBOARD_PATH,
    PENDING_APPROVAL_PATH,
};
