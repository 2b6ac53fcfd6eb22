//! Hosted auth adapter
//!
//! Implementation of the AuthProvider port over the auth REST API.

pub mod client;

pub use client::SupabaseAuthClient;
