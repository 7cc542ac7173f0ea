//! In-memory [`MasterProfileRepository`].
//!
//! Rows are stored as [`StoredMasterProfile`] so legacy rows with missing
//! aggregates can be seeded and repaired exactly as in PostgreSQL.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{MasterProfileRepository, MasterProfileRepositoryError};
use crate::domain::{MasterAggregates, StoredMasterProfile, UserId};

/// Mutex-guarded profile rows keyed by owner.
#[derive(Debug, Default)]
pub struct InMemoryMasterProfileRepository {
    rows: Mutex<HashMap<UserId, StoredMasterProfile>>,
}

impl InMemoryMasterProfileRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a raw row, including incomplete ones.
    pub fn seed(&self, row: StoredMasterProfile) -> Result<(), MasterProfileRepositoryError> {
        self.lock()?.insert(row.user_id, row);
        Ok(())
    }

    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<UserId, StoredMasterProfile>>, MasterProfileRepositoryError>
    {
        self.rows
            .lock()
            .map_err(|_| MasterProfileRepositoryError::query("master profile store lock poisoned"))
    }
}

#[async_trait]
impl MasterProfileRepository for InMemoryMasterProfileRepository {
    async fn find(
        &self,
        user_id: &UserId,
    ) -> Result<Option<StoredMasterProfile>, MasterProfileRepositoryError> {
        Ok(self.lock()?.get(user_id).cloned())
    }

    async fn ensure(
        &self,
        user_id: &UserId,
        defaults: &MasterAggregates,
    ) -> Result<bool, MasterProfileRepositoryError> {
        let mut rows = self.lock()?;
        if rows.contains_key(user_id) {
            return Ok(false);
        }
        rows.insert(
            *user_id,
            StoredMasterProfile {
                user_id: *user_id,
                rating: Some(defaults.rating),
                review_count: Some(defaults.review_count),
                completed_orders: Some(defaults.completed_orders),
            },
        );
        Ok(true)
    }

    async fn remove(&self, user_id: &UserId) -> Result<bool, MasterProfileRepositoryError> {
        Ok(self.lock()?.remove(user_id).is_some())
    }

    async fn count_incomplete(&self) -> Result<u64, MasterProfileRepositoryError> {
        let count = self
            .lock()?
            .values()
            .filter(|row| row.is_incomplete())
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn repair_incomplete(
        &self,
        defaults: &MasterAggregates,
    ) -> Result<u64, MasterProfileRepositoryError> {
        let repaired = self
            .lock()?
            .values_mut()
            .map(|row| row.repair(defaults))
            .filter(|changed| *changed)
            .count();
        Ok(u64::try_from(repaired).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn legacy(rating: Option<f64>, reviews: Option<u32>, done: Option<u32>) -> StoredMasterProfile {
        StoredMasterProfile {
            user_id: UserId::random(),
            rating,
            review_count: reviews,
            completed_orders: done,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn repair_fills_nulls_and_keeps_values() {
        let repo = InMemoryMasterProfileRepository::new();
        let partial = legacy(Some(4.5), None, Some(7));
        let empty = legacy(None, None, None);
        let complete = legacy(Some(3.0), Some(2), Some(1));
        for row in [partial.clone(), empty.clone(), complete.clone()] {
            repo.seed(row).expect("seed");
        }

        let defaults = MasterAggregates::default();
        assert_eq!(repo.count_incomplete().await.expect("count"), 2);
        assert_eq!(repo.repair_incomplete(&defaults).await.expect("repair"), 2);
        assert_eq!(repo.count_incomplete().await.expect("count"), 0);

        let fixed = repo
            .find(&partial.user_id)
            .await
            .expect("find")
            .expect("present");
        assert_eq!(fixed.rating, Some(4.5));
        assert_eq!(fixed.review_count, Some(0));
        assert_eq!(fixed.completed_orders, Some(7));
        let untouched = repo
            .find(&complete.user_id)
            .await
            .expect("find")
            .expect("present");
        assert_eq!(untouched, complete);
        assert_eq!(repo.repair_incomplete(&defaults).await.expect("repair"), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn ensure_creates_once() {
        let repo = InMemoryMasterProfileRepository::new();
        let id = UserId::random();
        let defaults = MasterAggregates::default();
        assert!(repo.ensure(&id, &defaults).await.expect("ensure"));
        assert!(!repo.ensure(&id, &defaults).await.expect("ensure"));
    }
}
