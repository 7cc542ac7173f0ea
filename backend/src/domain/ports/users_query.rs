//! Driving port for reading users.
//!
//! Inbound adapters use this port to fetch user records without importing
//! persistence concerns. It also backs the per-request session check that
//! re-loads the caller.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Domain use-case port for user lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// All users ordered by creation time.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// One user, or `not_found`.
    async fn find_user(&self, id: &UserId) -> Result<User, Error>;
}
