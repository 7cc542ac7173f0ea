//! Login, registration and administrator bootstrap.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::master_profile_service::ensure_profile_for;
use crate::domain::ports::{
    LoginService, MasterProfileRepository, PasswordHasher, RegistrationService, UserAccount,
    UserRepository,
};
use crate::domain::users_service::{map_hasher_error, map_user_persistence_error};
use crate::domain::{
    Email, Error, LoginCredentials, Password, Registration, Role, User, UserDraft, UserId,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Authentication service implementing [`LoginService`] and [`RegistrationService`].
#[derive(Clone)]
pub struct AuthenticationService<U, M, H> {
    users: Arc<U>,
    profiles: Arc<M>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U, M, H> AuthenticationService<U, M, H> {
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

impl<U, M, H> AuthenticationService<U, M, H>
where
    U: UserRepository,
    M: MasterProfileRepository,
    H: PasswordHasher,
{
    async fn create_account(&self, draft: UserDraft, password: &Password) -> Result<User, Error> {
        let password_hash = self
            .hasher
            .hash(password)
            .await
            .map_err(map_hasher_error)?;
        let account = UserAccount {
            user: User::register(UserId::random(), draft, self.clock.utc()),
            password_hash: Some(password_hash),
        };
        self.users
            .insert(&account)
            .await
            .map_err(map_user_persistence_error)?;
        ensure_profile_for(self.profiles.as_ref(), &account.user).await?;
        Ok(account.user)
    }

    /// Ensure an administrator account with the draft's email exists.
    ///
    /// The draft's role is ignored. An existing account is left untouched;
    /// a warning is logged when it does not hold the admin role.
    pub async fn ensure_admin(&self, draft: UserDraft, password: &Password) -> Result<User, Error> {
        let draft = UserDraft {
            role: Role::Admin,
            ..draft
        };
        let existing = self
            .users
            .find_account_by_email(&draft.email)
            .await
            .map_err(map_user_persistence_error)?;
        if let Some(account) = existing {
            if !account.user.role().is_admin() {
                warn!(
                    user_id = %account.user.id(),
                    role = %account.user.role(),
                    "bootstrap admin email belongs to a non-admin account"
                );
            }
            return Ok(account.user);
        }
        let user = self.create_account(draft, password).await?;
        info!(user_id = %user.id(), "bootstrap administrator created");
        Ok(user)
    }
}

#[async_trait]
impl<U, M, H> LoginService for AuthenticationService<U, M, H>
where
    U: UserRepository,
    M: MasterProfileRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Ok(email) = Email::new(credentials.email()) else {
            debug!("login rejected: malformed email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let account = self
            .users
            .find_account_by_email(&email)
            .await
            .map_err(map_user_persistence_error)?;
        let Some(UserAccount {
            user,
            password_hash: Some(hash),
        }) = account
        else {
            debug!("login rejected: unknown account or no password set");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let verified = self
            .hasher
            .verify(credentials.password(), &hash)
            .await
            .map_err(map_hasher_error)?;
        if !verified {
            debug!(user_id = %user.id(), "login rejected: password mismatch");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        if !user.is_active() {
            info!(user_id = %user.id(), "login refused for blocked account");
            return Err(Error::forbidden("account is blocked"));
        }
        info!(user_id = %user.id(), role = %user.role(), "user logged in");
        Ok(user)
    }
}

#[async_trait]
impl<U, M, H> RegistrationService for AuthenticationService<U, M, H>
where
    U: UserRepository,
    M: MasterProfileRepository,
    H: PasswordHasher,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let (draft, password) = registration.into_parts();
        let user = self.create_account(draft, &password).await?;
        info!(user_id = %user.id(), role = %user.role(), "user registered");
        Ok(user)
    }
}

#[cfg(test)]
mod tests;
