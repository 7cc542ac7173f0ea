//! Mutex-guarded in-memory [`UserRepository`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{UserAccount, UserPersistenceError, UserRepository};
use crate::domain::{Email, User, UserId, UserPatch};

#[derive(Debug, Default)]
struct UserTable {
    next_seq: u64,
    rows: HashMap<UserId, (u64, UserAccount)>,
}

impl UserTable {
    fn email_taken(&self, email: &Email, except: Option<&UserId>) -> bool {
        self.rows
            .iter()
            .any(|(id, (_, account))| Some(id) != except && account.user.email() == email)
    }
}

/// In-memory user store keyed by id, preserving insertion order for listing.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Mutex<UserTable>,
}

impl InMemoryUserRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, UserTable>, UserPersistenceError> {
        self.table
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let table = self.lock()?;
        let mut rows: Vec<_> = table.rows.values().collect();
        rows.sort_by_key(|(seq, account)| (account.user.created_at(), *seq));
        Ok(rows
            .into_iter()
            .map(|(_, account)| account.user.clone())
            .collect())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()?
            .rows
            .get(id)
            .map(|(_, account)| account.user.clone()))
    }

    async fn find_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(self
            .lock()?
            .rows
            .values()
            .find(|(_, account)| account.user.email() == email)
            .map(|(_, account)| account.clone()))
    }

    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut table = self.lock()?;
        if table.email_taken(account.user.email(), None) {
            return Err(UserPersistenceError::duplicate_email(
                account.user.email().as_ref(),
            ));
        }
        let seq = table.next_seq;
        table.next_seq += 1;
        table
            .rows
            .insert(*account.user.id(), (seq, account.clone()));
        Ok(())
    }

    async fn update(
        &self,
        id: &UserId,
        patch: &UserPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut table = self.lock()?;
        if let Some(email) = &patch.email {
            if table.rows.contains_key(id) && table.email_taken(email, Some(id)) {
                return Err(UserPersistenceError::duplicate_email(email.as_ref()));
            }
        }
        Ok(table.rows.get_mut(id).map(|(_, account)| {
            account.user.apply(patch, now);
            account.user.clone()
        }))
    }

    async fn toggle_active(
        &self,
        id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.rows.get_mut(id).map(|(_, account)| {
            account.user.toggle_active(now);
            account.user.clone()
        }))
    }

    async fn delete(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()?
            .rows
            .remove(id)
            .map(|(_, account)| account.user))
    }
}
