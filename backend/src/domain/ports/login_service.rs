//! Driving ports for login and self-registration.
//!
//! Inbound adapters call these to authenticate credentials or create accounts
//! without knowing the backing store or hashing scheme.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, User};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    ///
    /// Unknown emails and wrong passwords both yield `unauthorized`; blocked
    /// accounts yield `forbidden`.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}

/// Domain use-case port for self-registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create a client or master account.
    async fn register(&self, registration: Registration) -> Result<User, Error>;
}
