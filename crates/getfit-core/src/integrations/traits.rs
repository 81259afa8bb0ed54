use crate::error::{AuthError, Result};
use crate::storage::Database;

/// Opaque account identifier issued by the identity provider.
pub type UserId = String;

/// Email/password identity service.
///
/// Every call answers with success or a human-readable failure. Callers
/// never retry; a failure is reported to the user and nothing else.
pub trait IdentityProvider: Send + Sync {
    /// Create an account and return its id.
    fn create_user(&self, email: &str, password: &str) -> Result<UserId, AuthError>;

    fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AuthError>;

    fn send_password_reset_email(&self, email: &str) -> Result<(), AuthError>;

    /// Check the one-time code from a reset email.
    fn verify_password_reset_code(&self, code: &str) -> Result<(), AuthError>;

    fn confirm_password_reset(&self, code: &str, new_password: &str) -> Result<(), AuthError>;

    fn send_email_verification(&self, _user: &str) -> Result<(), AuthError> {
        Ok(()) // default no-op
    }
}

/// Write-only user profile storage, keyed by [`UserId`].
pub trait ProfileStore {
    fn write_new_user(&self, id: &str, username: &str, email: &str) -> Result<()>;

    fn update_weight(&self, id: &str, kg: f32) -> Result<()>;

    fn update_height(&self, id: &str, cm: f32) -> Result<()>;
}

impl ProfileStore for Database {
    fn write_new_user(&self, id: &str, username: &str, email: &str) -> Result<()> {
        self.upsert_user(id, username, email)
    }

    fn update_weight(&self, id: &str, kg: f32) -> Result<()> {
        self.upsert_weight(id, kg)
    }

    fn update_height(&self, id: &str, cm: f32) -> Result<()> {
        self.upsert_height(id, cm)
    }
}
