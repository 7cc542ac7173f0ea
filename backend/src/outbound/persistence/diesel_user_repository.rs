//! PostgreSQL-backed [`UserRepository`].
//!
//! Every mutation is a single-row statement with `RETURNING`, so concurrent
//! requests touching different users never interfere and no read-modify-write
//! happens in application memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::not;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserAccount, UserPersistenceError, UserRepository};
use crate::domain::{Email, PasswordHash, Role, User, UserDraft, UserId, UserName, UserPatch};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";

diesel::define_sql_function! {
    /// SQL `lower(text)`, matching the case-blind unique index on email.
    fn lower(value: diesel::sql_types::Text) -> diesel::sql_types::Text;
}

/// Diesel implementation of the user port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn map_write_error(error: diesel::result::Error, email: Option<&Email>) -> UserPersistenceError {
    match email {
        Some(email) if is_unique_violation(&error, Some(EMAIL_CONSTRAINT)) => {
            UserPersistenceError::duplicate_email(email.as_ref())
        }
        _ => map_diesel_error(error),
    }
}

fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let invalid = |field: &str, err: &dyn std::fmt::Display| {
        UserPersistenceError::query(format!("stored user {} has invalid {field}: {err}", row.id))
    };
    let draft = UserDraft {
        name: UserName::new(&row.name).map_err(|err| invalid("name", &err))?,
        email: Email::new(&row.email).map_err(|err| invalid("email", &err))?,
        role: row
            .role
            .parse::<Role>()
            .map_err(|err| invalid("role", &err))?,
    };
    let user = User::restore(
        UserId::from_uuid(row.id),
        draft,
        row.active,
        row.created_at,
        row.updated_at,
    );
    Ok(UserAccount {
        user,
        password_hash: row.password_hash.map(PasswordHash::new),
    })
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    row_to_account(row).map(|account| account.user)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by((users::created_at.asc(), users::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn find_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(lower(users::email).eq(email.normalized()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_account)
            .transpose()
    }

    async fn insert(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let user = &account.user;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            role: user.role().as_str(),
            active: user.is_active(),
            password_hash: account.password_hash.as_ref().map(PasswordHash::as_str),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, Some(user.email())))
    }

    async fn update(
        &self,
        id: &UserId,
        patch: &UserPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = UserChangeset {
            name: patch.name.as_ref().map(AsRef::as_ref),
            email: patch.email.as_ref().map(AsRef::as_ref),
            role: patch.role.map(Role::as_str),
            updated_at: now,
        };
        diesel::update(users::table.find(id.as_uuid()))
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_write_error(err, patch.email.as_ref()))?
            .map(row_to_user)
            .transpose()
    }

    async fn toggle_active(
        &self,
        id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set((users::active.eq(not(users::active)), users::updated_at.eq(now)))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn delete(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(users::table.find(id.as_uuid()))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_user)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_instant;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    #[fixture]
    fn row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            name: "Igor Petrov".to_owned(),
            email: "igor@example.com".to_owned(),
            role: "verified_master".to_owned(),
            active: false,
            password_hash: Some("$2b$04$hash".to_owned()),
            created_at: fixture_instant(),
            updated_at: fixture_instant(),
        }
    }

    #[rstest]
    fn row_converts_to_account(row: UserRow) {
        let account = row_to_account(row).expect("valid row");
        assert_eq!(account.user.role(), Role::VerifiedMaster);
        assert!(!account.user.is_active());
        assert_eq!(
            account.password_hash.as_ref().map(PasswordHash::as_str),
            Some("$2b$04$hash")
        );
    }

    #[rstest]
    fn unknown_role_is_a_query_error(mut row: UserRow) {
        row.role = "superuser".to_owned();
        let err = row_to_account(row).expect_err("invalid role");
        assert_eq!(err.kind(), "query");
    }

    #[rstest]
    fn unique_violation_maps_to_duplicate_email() {
        let email = Email::new("igor@example.com").expect("email");
        let err = map_write_error(
            DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                Box::new("duplicate key value".to_owned()),
            ),
            Some(&email),
        );
        assert_eq!(
            err,
            UserPersistenceError::duplicate_email("igor@example.com")
        );
    }

    #[rstest]
    fn pool_errors_map_to_connection() {
        let err = map_pool_error(PoolError::checkout("refused"));
        assert!(matches!(err, UserPersistenceError::Connection { .. }));
    }
}
