//! Driving port for administrator user management.

use async_trait::async_trait;

use crate::domain::{Error, Password, Role, User, UserDraft, UserId, UserPatch};

/// Account to create on behalf of an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserRequest {
    /// Validated profile fields.
    pub draft: UserDraft,
    /// Initial password; without one the account cannot log in.
    pub password: Option<Password>,
}

/// Domain use-case port for user mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Create an active user. Duplicate emails yield `conflict`.
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, Error>;

    /// Apply a partial update. Unknown ids yield `not_found`.
    async fn update_user(&self, id: &UserId, patch: UserPatch) -> Result<User, Error>;

    /// Delete a user and return the removed record.
    async fn delete_user(&self, id: &UserId) -> Result<User, Error>;

    /// Flip the active flag.
    async fn toggle_active(&self, id: &UserId) -> Result<User, Error>;

    /// Assign a role; master roles get a profile if they lack one.
    async fn change_role(&self, id: &UserId, role: Role) -> Result<User, Error>;
}
