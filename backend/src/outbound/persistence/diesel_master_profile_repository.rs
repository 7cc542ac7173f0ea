//! PostgreSQL-backed [`MasterProfileRepository`].
//!
//! Aggregate columns are nullable for legacy rows; the repair locks the
//! incomplete rows and fills each null column with its default inside one
//! transaction, leaving non-null values untouched.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{MasterProfileRepository, MasterProfileRepositoryError};
use crate::domain::{MasterAggregates, StoredMasterProfile, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{MasterProfileRow, NewMasterProfileRow};
use super::pool::{DbPool, PoolError};
use super::schema::master_profiles;

/// Diesel implementation of the master profile port.
#[derive(Clone)]
pub struct DieselMasterProfileRepository {
    pool: DbPool,
}

impl DieselMasterProfileRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MasterProfileRepositoryError {
    map_basic_pool_error(error, MasterProfileRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MasterProfileRepositoryError {
    map_basic_diesel_error(
        error,
        MasterProfileRepositoryError::query,
        MasterProfileRepositoryError::connection,
    )
}

fn count_to_db(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

fn count_from_db(
    user_id: Uuid,
    column: &str,
    value: Option<i32>,
) -> Result<Option<u32>, MasterProfileRepositoryError> {
    value
        .map(|raw| {
            u32::try_from(raw).map_err(|_| {
                MasterProfileRepositoryError::query(format!(
                    "master profile {user_id} has negative {column}: {raw}"
                ))
            })
        })
        .transpose()
}

fn row_to_stored(row: MasterProfileRow) -> Result<StoredMasterProfile, MasterProfileRepositoryError> {
    Ok(StoredMasterProfile {
        user_id: UserId::from_uuid(row.user_id),
        rating: row.rating,
        review_count: count_from_db(row.user_id, "review_count", row.review_count)?,
        completed_orders: count_from_db(row.user_id, "completed_orders", row.completed_orders)?,
    })
}

/// Row has at least one null aggregate.
macro_rules! incomplete {
    () => {
        master_profiles::rating
            .is_null()
            .or(master_profiles::review_count.is_null())
            .or(master_profiles::completed_orders.is_null())
    };
}

#[async_trait]
impl MasterProfileRepository for DieselMasterProfileRepository {
    async fn find(
        &self,
        user_id: &UserId,
    ) -> Result<Option<StoredMasterProfile>, MasterProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        master_profiles::table
            .find(user_id.as_uuid())
            .select(MasterProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_stored)
            .transpose()
    }

    async fn ensure(
        &self,
        user_id: &UserId,
        defaults: &MasterAggregates,
    ) -> Result<bool, MasterProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewMasterProfileRow {
            user_id: *user_id.as_uuid(),
            rating: Some(defaults.rating),
            review_count: Some(count_to_db(defaults.review_count)),
            completed_orders: Some(count_to_db(defaults.completed_orders)),
        };
        let inserted = diesel::insert_into(master_profiles::table)
            .values(&row)
            .on_conflict(master_profiles::user_id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn remove(&self, user_id: &UserId) -> Result<bool, MasterProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(master_profiles::table.find(user_id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn count_incomplete(&self) -> Result<u64, MasterProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = master_profiles::table
            .filter(incomplete!())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn repair_incomplete(
        &self,
        defaults: &MasterAggregates,
    ) -> Result<u64, MasterProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let defaults = *defaults;
        let repaired = conn
            .transaction(|conn| {
                async move {
                    let ids: Vec<Uuid> = master_profiles::table
                        .filter(incomplete!())
                        .select(master_profiles::user_id)
                        .for_update()
                        .load(conn)
                        .await?;
                    if ids.is_empty() {
                        return Ok(0);
                    }
                    diesel::update(
                        master_profiles::table.filter(
                            master_profiles::user_id
                                .eq_any(&ids)
                                .and(master_profiles::rating.is_null()),
                        ),
                    )
                    .set(master_profiles::rating.eq(Some(defaults.rating)))
                    .execute(conn)
                    .await?;
                    diesel::update(
                        master_profiles::table.filter(
                            master_profiles::user_id
                                .eq_any(&ids)
                                .and(master_profiles::review_count.is_null()),
                        ),
                    )
                    .set(master_profiles::review_count.eq(Some(count_to_db(defaults.review_count))))
                    .execute(conn)
                    .await?;
                    diesel::update(
                        master_profiles::table.filter(
                            master_profiles::user_id
                                .eq_any(&ids)
                                .and(master_profiles::completed_orders.is_null()),
                        ),
                    )
                    .set(
                        master_profiles::completed_orders
                            .eq(Some(count_to_db(defaults.completed_orders))),
                    )
                    .execute(conn)
                    .await?;
                    Ok::<usize, diesel::result::Error>(ids.len())
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(repaired).unwrap_or(u64::MAX))
    }
}
