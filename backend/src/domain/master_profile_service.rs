//! Master profile domain service.
//!
//! Serves profile reads with non-null aggregates and runs the repair that
//! fills aggregates missing from legacy rows.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    MasterProfileRepository, MasterProfileRepositoryError, MasterProfilesCommand,
    MasterProfilesQuery, UserRepository,
};
use crate::domain::users_service::map_user_persistence_error;
use crate::domain::{Error, MasterAggregates, MasterProfile, RepairReport, User, UserId};

pub(crate) fn map_profile_error(error: MasterProfileRepositoryError) -> Error {
    match error {
        MasterProfileRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("master profile store unavailable: {message}"))
        }
        MasterProfileRepositoryError::Query { message } => {
            Error::internal(format!("master profile store error: {message}"))
        }
    }
}

/// Create a default profile for `user` when it holds a master role.
pub(crate) async fn ensure_profile_for<M>(profiles: &M, user: &User) -> Result<(), Error>
where
    M: MasterProfileRepository + ?Sized,
{
    if !user.role().is_master() {
        return Ok(());
    }
    let created = profiles
        .ensure(user.id(), &MasterAggregates::default())
        .await
        .map_err(map_profile_error)?;
    if created {
        info!(user_id = %user.id(), "created default master profile");
    }
    Ok(())
}

/// Master profile service implementing the driving ports.
#[derive(Clone)]
pub struct MasterProfileService<U, M> {
    users: Arc<U>,
    profiles: Arc<M>,
    defaults: MasterAggregates,
}

impl<U, M> MasterProfileService<U, M> {
    /// Create a service using the standard default aggregates.
    pub fn new(users: Arc<U>, profiles: Arc<M>) -> Self {
        Self {
            users,
            profiles,
            defaults: MasterAggregates::default(),
        }
    }
}

#[async_trait]
impl<U, M> MasterProfilesQuery for MasterProfileService<U, M>
where
    U: UserRepository,
    M: MasterProfileRepository,
{
    async fn profile(&self, master_id: &UserId) -> Result<MasterProfile, Error> {
        let user = self
            .users
            .find_by_id(master_id)
            .await
            .map_err(map_user_persistence_error)?
            .filter(|user| user.role().is_master())
            .ok_or_else(|| Error::not_found("master not found"))?;

        let stored = self
            .profiles
            .find(user.id())
            .await
            .map_err(map_profile_error)?;
        match stored {
            Some(row) => {
                if row.is_incomplete() {
                    warn!(user_id = %master_id, "master profile has missing aggregates");
                }
                Ok(row.to_profile(&self.defaults))
            }
            None => {
                warn!(user_id = %master_id, "master has no profile row");
                Ok(MasterProfile::with_aggregates(*user.id(), self.defaults))
            }
        }
    }
}

#[async_trait]
impl<U, M> MasterProfilesCommand for MasterProfileService<U, M>
where
    U: UserRepository,
    M: MasterProfileRepository,
{
    async fn repair(&self) -> Result<RepairReport, Error> {
        let repaired = self
            .profiles
            .repair_incomplete(&self.defaults)
            .await
            .map_err(map_profile_error)?;
        let remaining_incomplete = self
            .profiles
            .count_incomplete()
            .await
            .map_err(map_profile_error)?;
        info!(repaired, remaining_incomplete, "master profile repair finished");
        Ok(RepairReport {
            repaired,
            remaining_incomplete,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockMasterProfileRepository, MockUserRepository};
    use crate::domain::{Email, ErrorCode, Role, StoredMasterProfile, UserDraft, UserName};
    use chrono::Utc;
    use rstest::rstest;

    fn user_with_role(role: Role) -> User {
        let draft = UserDraft {
            name: UserName::new("Pavel").expect("valid name"),
            email: Email::new("pavel@example.com").expect("valid email"),
            role,
        };
        User::register(UserId::random(), draft, Utc::now())
    }

    fn service(
        users: MockUserRepository,
        profiles: MockMasterProfileRepository,
    ) -> MasterProfileService<MockUserRepository, MockMasterProfileRepository> {
        MasterProfileService::new(Arc::new(users), Arc::new(profiles))
    }

    #[rstest]
    #[tokio::test]
    async fn profile_of_client_is_not_found() {
        let client = user_with_role(Role::Client);
        let id = *client.id();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(client)));
        let mut profiles = MockMasterProfileRepository::new();
        profiles.expect_find().never();

        let err = service(users, profiles)
            .profile(&id)
            .await
            .expect_err("clients have no profile");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn legacy_row_is_served_with_defaults() {
        let master = user_with_role(Role::VerifiedMaster);
        let id = *master.id();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(master)));
        let mut profiles = MockMasterProfileRepository::new();
        profiles.expect_find().return_once(move |_| {
            Ok(Some(StoredMasterProfile {
                user_id: id,
                rating: Some(4.8),
                review_count: None,
                completed_orders: Some(12),
            }))
        });

        let profile = service(users, profiles)
            .profile(&id)
            .await
            .expect("profile served");
        assert_eq!(profile.rating(), 4.8);
        assert_eq!(profile.review_count(), 0);
        assert_eq!(profile.completed_orders(), 12);
    }

    #[rstest]
    #[tokio::test]
    async fn repair_reports_changed_and_remaining_rows() {
        let mut profiles = MockMasterProfileRepository::new();
        profiles
            .expect_repair_incomplete()
            .withf(|defaults| *defaults == MasterAggregates::default())
            .times(1)
            .return_once(|_| Ok(3));
        profiles
            .expect_count_incomplete()
            .times(1)
            .return_once(|| Ok(0));

        let report = service(MockUserRepository::new(), profiles)
            .repair()
            .await
            .expect("repair succeeds");
        assert_eq!(
            report,
            RepairReport {
                repaired: 3,
                remaining_incomplete: 0
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn repair_surfaces_unavailable_store() {
        let mut profiles = MockMasterProfileRepository::new();
        profiles
            .expect_repair_incomplete()
            .return_once(|_| Err(MasterProfileRepositoryError::connection("refused")));

        let err = service(MockUserRepository::new(), profiles)
            .repair()
            .await
            .expect_err("store down");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn ensure_profile_skips_clients() {
        let mut profiles = MockMasterProfileRepository::new();
        profiles.expect_ensure().never();
        ensure_profile_for(&profiles, &user_with_role(Role::Client))
            .await
            .expect("no-op for clients");
    }

    #[rstest]
    #[tokio::test]
    async fn ensure_profile_creates_for_masters() {
        let mut profiles = MockMasterProfileRepository::new();
        profiles.expect_ensure().times(1).return_once(|_, _| Ok(true));
        ensure_profile_for(&profiles, &user_with_role(Role::Master))
            .await
            .expect("profile ensured");
    }
}
