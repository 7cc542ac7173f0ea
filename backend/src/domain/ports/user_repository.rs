//! Port abstraction for user persistence adapters and their errors.
//!
//! Every mutation addresses a single record so that concurrent requests never
//! overwrite each other's changes to unrelated users.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Email, PasswordHash, User, UserId, UserPatch};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another user already owns the email address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// User record together with its stored credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Profile fields.
    pub user: User,
    /// Password hash; `None` for accounts that cannot log in yet.
    pub password_hash: Option<PasswordHash>,
}

/// Storage for users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users ordered by creation time.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and credentials by normalised email.
    async fn find_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Insert a new account, failing with `DuplicateEmail` on a taken address.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError>;

    /// Apply a partial update; `None` when the user does not exist.
    async fn update(
        &self,
        id: &UserId,
        patch: &UserPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Flip the active flag; `None` when the user does not exist.
    async fn toggle_active(
        &self,
        id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Remove a user, returning the removed record.
    async fn delete(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;
}
