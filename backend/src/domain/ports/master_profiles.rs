//! Driving ports for master profiles.

use async_trait::async_trait;

use crate::domain::{Error, MasterProfile, RepairReport, UserId};

/// Read access to master profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MasterProfilesQuery: Send + Sync {
    /// Profile of a master; `not_found` for unknown users and non-masters.
    async fn profile(&self, master_id: &UserId) -> Result<MasterProfile, Error>;
}

/// Maintenance operations on master profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MasterProfilesCommand: Send + Sync {
    /// Replace missing aggregates with defaults.
    async fn repair(&self) -> Result<RepairReport, Error>;
}
