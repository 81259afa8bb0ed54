use super::traits::{IdentityProvider, ProfileStore, UserId};
use crate::error::{AuthError, Result, ValidationError};

/// Sign-up, sign-in and password reset on top of an identity provider,
/// keeping the profile store in step with new accounts.
pub struct AuthManager<P, S> {
    provider: P,
    profiles: S,
}

impl<P: IdentityProvider, S: ProfileStore> AuthManager<P, S> {
    pub fn new(provider: P, profiles: S) -> Self {
        Self { provider, profiles }
    }

    pub fn profiles(&self) -> &S {
        &self.profiles
    }

    /// Create the account, write its profile, then request email verification.
    ///
    /// Only the account creation decides the outcome: profile and
    /// verification failures are logged and the new id is still returned.
    ///
    /// # Errors
    /// Returns a validation error for blank input, or the provider's rejection.
    pub fn create_user(&self, username: &str, email: &str, password: &str) -> Result<UserId> {
        require_non_blank("username", username)?;
        require_email(email)?;
        require_non_blank("password", password)?;

        let id = self
            .provider
            .create_user(email, password)
            .inspect(|_| tracing::debug!("createUserWithEmail: success"))
            .inspect_err(|e| tracing::warn!(error = %e, "createUserWithEmail: failure"))?;

        if let Err(e) = self.profiles.write_new_user(&id, username, email) {
            tracing::error!(user = %id, error = %e, "failed to write new user profile");
        }
        match self.provider.send_email_verification(&id) {
            Ok(()) => tracing::debug!(user = %id, "verification email sent"),
            Err(e) => tracing::warn!(user = %id, error = %e, "verification email failed"),
        }
        Ok(id)
    }

    /// # Errors
    /// Returns the provider's rejection.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<UserId> {
        require_email(email)?;
        let id = logged("signInWithEmail", self.provider.sign_in(email, password))?;
        Ok(id)
    }

    /// # Errors
    /// Returns the provider's rejection.
    pub fn send_password_reset_email(&self, email: &str) -> Result<()> {
        require_email(email)?;
        logged(
            "sendPasswordResetEmail",
            self.provider.send_password_reset_email(email),
        )?;
        Ok(())
    }

    /// # Errors
    /// Returns the provider's rejection.
    pub fn verify_password_reset_code(&self, code: &str) -> Result<()> {
        require_non_blank("code", code)?;
        logged(
            "verifyPasswordResetCode",
            self.provider.verify_password_reset_code(code),
        )?;
        Ok(())
    }

    /// # Errors
    /// Returns the provider's rejection.
    pub fn confirm_password_reset(&self, code: &str, new_password: &str) -> Result<()> {
        require_non_blank("code", code)?;
        require_non_blank("password", new_password)?;
        logged(
            "confirmPasswordReset",
            self.provider.confirm_password_reset(code, new_password),
        )?;
        Ok(())
    }

    /// # Errors
    /// Returns a validation error for a non-positive weight, or a store error.
    pub fn update_weight(&self, id: &str, kg: f32) -> Result<()> {
        validate_body_metric("weight", kg)?;
        self.profiles.update_weight(id, kg)
    }

    /// # Errors
    /// Returns a validation error for a non-positive height, or a store error.
    pub fn update_height(&self, id: &str, cm: f32) -> Result<()> {
        validate_body_metric("height", cm)?;
        self.profiles.update_height(id, cm)
    }
}

fn logged<T>(operation: &str, result: Result<T, AuthError>) -> Result<T, AuthError> {
    match &result {
        Ok(_) => tracing::debug!("{operation}: success"),
        Err(e) => tracing::warn!(error = %e, "{operation}: failure"),
    }
    result
}

/// Body measurements must be finite and positive.
///
/// # Errors
/// Returns a `ValidationError` naming `field`.
pub fn validate_body_metric(field: &str, value: f32) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::invalid(field, "must be a positive number"));
    }
    Ok(())
}

fn require_non_blank(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::invalid(field, "must not be blank"));
    }
    Ok(())
}

fn require_email(email: &str) -> Result<(), ValidationError> {
    require_non_blank("email", email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::invalid("email", "is not an email address")),
    }
}
