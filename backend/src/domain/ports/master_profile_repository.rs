//! Port for master profile storage, including legacy rows with missing aggregates.

use async_trait::async_trait;

use crate::domain::{MasterAggregates, StoredMasterProfile, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by master profile adapters.
    pub enum MasterProfileRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "master profile repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "master profile repository query failed: {message}",
    }
}

/// Storage for master profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MasterProfileRepository: Send + Sync {
    /// Stored row for a master, as persisted.
    async fn find(
        &self,
        user_id: &UserId,
    ) -> Result<Option<StoredMasterProfile>, MasterProfileRepositoryError>;

    /// Insert a profile with `defaults` unless one already exists.
    ///
    /// Returns `true` when a row was created.
    async fn ensure(
        &self,
        user_id: &UserId,
        defaults: &MasterAggregates,
    ) -> Result<bool, MasterProfileRepositoryError>;

    /// Delete the profile owned by `user_id`.
    ///
    /// Returns `true` when a row was removed.
    async fn remove(&self, user_id: &UserId) -> Result<bool, MasterProfileRepositoryError>;

    /// Number of rows with at least one missing aggregate.
    async fn count_incomplete(&self) -> Result<u64, MasterProfileRepositoryError>;

    /// Fill missing aggregates with `defaults`, keeping present values.
    ///
    /// Returns the number of rows changed.
    async fn repair_incomplete(
        &self,
        defaults: &MasterAggregates,
    ) -> Result<u64, MasterProfileRepositoryError>;
}
