//! SeaORM entity definitions
//!
//! Row models for the tables owned by the hosted database.

pub mod doctors;
pub mod invites;
pub mod patients;
