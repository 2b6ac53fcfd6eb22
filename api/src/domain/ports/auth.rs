//! Auth provider port trait
//!
//! Defines the interface for the hosted authentication service.
//! Accounts, passwords and sessions live there; this service only
//! forwards credentials and tokens.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{AuthSession, AuthUser, SignUp, UserRole};
use crate::error::SupabaseError;

/// Port trait for authentication operations
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange email and password for a session
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError>;

    /// Exchange a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, SupabaseError>;

    /// Create an account. The role is stored in the user's metadata.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<SignUp, SupabaseError>;

    /// Revoke the session behind an access token
    async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError>;

    /// Resolve an access token to its user
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError>;

    /// Delete an account (requires the service role key)
    async fn delete_user(&self, id: Uuid) -> Result<(), SupabaseError>;
}
