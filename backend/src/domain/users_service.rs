//! User directory service backing the administrator CRUD routes.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::master_profile_service::{ensure_profile_for, map_profile_error};
use crate::domain::ports::{
    CreateUserRequest, MasterProfileRepository, PasswordHasher, PasswordHasherError,
    UserAccount, UserPersistenceError, UserRepository, UsersCommand, UsersQuery,
};
use crate::domain::{Error, Role, User, UserId, UserPatch};

pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user store error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::conflict("email already registered").with_details(json!({
                "field": "email",
                "code": "email_taken",
                "value": email,
            }))
        }
    }
}

pub(crate) fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

fn user_not_found(id: &UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

/// User directory service implementing [`UsersQuery`] and [`UsersCommand`].
#[derive(Clone)]
pub struct UserDirectoryService<U, M, H> {
    users: Arc<U>,
    profiles: Arc<M>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U, M, H> UserDirectoryService<U, M, H> {
    /// Create a new service with the given adapters.
    pub fn new(users: Arc<U>, profiles: Arc<M>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            profiles,
            hasher,
            clock,
        }
    }
}

impl<U, M, H> UserDirectoryService<U, M, H>
where
    U: UserRepository,
    M: MasterProfileRepository,
    H: PasswordHasher,
{
    async fn require_updated(&self, id: &UserId, updated: Option<User>) -> Result<User, Error> {
        let user = updated.ok_or_else(|| user_not_found(id))?;
        ensure_profile_for(self.profiles.as_ref(), &user).await?;
        Ok(user)
    }
}

#[async_trait]
impl<U, M, H> UsersQuery for UserDirectoryService<U, M, H>
where
    U: UserRepository,
    M: MasterProfileRepository,
    H: PasswordHasher,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(map_user_persistence_error)
    }

    async fn find_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| user_not_found(id))
    }
}

#[async_trait]
impl<U, M, H> UsersCommand for UserDirectoryService<U, M, H>
where
    U: UserRepository,
    M: MasterProfileRepository,
    H: PasswordHasher,
{
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, Error> {
        let password_hash = match &request.password {
            Some(password) => Some(
                self.hasher
                    .hash(password)
                    .await
                    .map_err(map_hasher_error)?,
            ),
            None => None,
        };
        let user = User::register(UserId::random(), request.draft, self.clock.utc());
        let account = UserAccount {
            user,
            password_hash,
        };
        self.users
            .insert(&account)
            .await
            .map_err(map_user_persistence_error)?;
        ensure_profile_for(self.profiles.as_ref(), &account.user).await?;
        info!(user_id = %account.user.id(), role = %account.user.role(), "user created");
        Ok(account.user)
    }

    async fn update_user(&self, id: &UserId, patch: UserPatch) -> Result<User, Error> {
        let updated = self
            .users
            .update(id, &patch, self.clock.utc())
            .await
            .map_err(map_user_persistence_error)?;
        let user = self.require_updated(id, updated).await?;
        info!(user_id = %id, "user updated");
        Ok(user)
    }

    async fn delete_user(&self, id: &UserId) -> Result<User, Error> {
        let removed = self
            .users
            .delete(id)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| user_not_found(id))?;
        // PostgreSQL cascades this; other stores rely on the explicit delete.
        self.profiles
            .remove(id)
            .await
            .map_err(map_profile_error)?;
        info!(user_id = %id, "user deleted");
        Ok(removed)
    }

    async fn toggle_active(&self, id: &UserId) -> Result<User, Error> {
        let user = self
            .users
            .toggle_active(id, self.clock.utc())
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| user_not_found(id))?;
        info!(user_id = %id, active = user.is_active(), "user active flag toggled");
        Ok(user)
    }

    async fn change_role(&self, id: &UserId, role: Role) -> Result<User, Error> {
        let updated = self
            .users
            .update(id, &UserPatch::role(role), self.clock.utc())
            .await
            .map_err(map_user_persistence_error)?;
        let user = self.require_updated(id, updated).await?;
        info!(user_id = %id, role = %role, "user role changed");
        Ok(user)
    }
}
