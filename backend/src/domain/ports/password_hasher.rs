//! Port for one-way password hashing.

use async_trait::async_trait;

use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Failures raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// The hash could not be computed or parsed.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Hashes new passwords and verifies login attempts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a policy-compliant password.
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError>;

    /// Check a login attempt against a stored hash.
    async fn verify(
        &self,
        candidate: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError>;
}
