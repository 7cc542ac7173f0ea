//! Master (craftsman) profile aggregates.
//!
//! The domain profile never has missing aggregates. Older stored rows may;
//! [`StoredMasterProfile`] models such a row and [`MasterAggregates`] holds the
//! values used to fill the gaps.

use serde::Serialize;

use super::user::UserId;

/// Highest rating a master can hold.
pub const MAX_RATING: f64 = 5.0;

/// Default aggregate values for new or repaired profiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasterAggregates {
    /// Average review score, 0.0..=5.0.
    pub rating: f64,
    /// Number of reviews received.
    pub review_count: u32,
    /// Number of finished orders.
    pub completed_orders: u32,
}

impl Default for MasterAggregates {
    fn default() -> Self {
        Self {
            rating: 0.0,
            review_count: 0,
            completed_orders: 0,
        }
    }
}

/// Public profile of a master.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterProfile {
    user_id: UserId,
    rating: f64,
    review_count: u32,
    completed_orders: u32,
}

impl MasterProfile {
    /// Fresh profile with default aggregates.
    pub fn new_default(user_id: UserId) -> Self {
        Self::with_aggregates(user_id, MasterAggregates::default())
    }

    /// Profile with explicit aggregates. The rating is clamped to 0.0..=5.0.
    pub fn with_aggregates(user_id: UserId, aggregates: MasterAggregates) -> Self {
        let rating = if aggregates.rating.is_finite() {
            aggregates.rating.clamp(0.0, MAX_RATING)
        } else {
            0.0
        };
        Self {
            user_id,
            rating,
            review_count: aggregates.review_count,
            completed_orders: aggregates.completed_orders,
        }
    }

    /// Owning user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Average review score.
    pub fn rating(&self) -> f64 {
        self.rating
    }

    /// Number of reviews.
    pub fn review_count(&self) -> u32 {
        self.review_count
    }

    /// Number of finished orders.
    pub fn completed_orders(&self) -> u32 {
        self.completed_orders
    }
}

/// Profile row as persisted, where aggregates may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMasterProfile {
    /// Owning user.
    pub user_id: UserId,
    /// Stored rating, if any.
    pub rating: Option<f64>,
    /// Stored review count, if any.
    pub review_count: Option<u32>,
    /// Stored completed order count, if any.
    pub completed_orders: Option<u32>,
}

impl StoredMasterProfile {
    /// True when any aggregate is missing.
    pub fn is_incomplete(&self) -> bool {
        self.rating.is_none() || self.review_count.is_none() || self.completed_orders.is_none()
    }

    /// Fill missing aggregates from `defaults`, keeping stored values.
    ///
    /// Returns whether anything changed.
    pub fn repair(&mut self, defaults: &MasterAggregates) -> bool {
        let changed = self.is_incomplete();
        self.rating.get_or_insert(defaults.rating);
        self.review_count.get_or_insert(defaults.review_count);
        self.completed_orders.get_or_insert(defaults.completed_orders);
        changed
    }

    /// Domain view of the row, substituting defaults for missing values.
    pub fn to_profile(&self, defaults: &MasterAggregates) -> MasterProfile {
        MasterProfile::with_aggregates(
            self.user_id,
            MasterAggregates {
                rating: self.rating.unwrap_or(defaults.rating),
                review_count: self.review_count.unwrap_or(defaults.review_count),
                completed_orders: self.completed_orders.unwrap_or(defaults.completed_orders),
            },
        )
    }
}

/// Outcome of a repair run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    /// Rows whose missing aggregates were filled.
    pub repaired: u64,
    /// Rows still incomplete after the run.
    pub remaining_incomplete: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn legacy() -> StoredMasterProfile {
        StoredMasterProfile {
            user_id: UserId::random(),
            rating: None,
            review_count: Some(7),
            completed_orders: None,
        }
    }

    #[rstest]
    fn repair_fills_only_missing_values(mut legacy: StoredMasterProfile) {
        let changed = legacy.repair(&MasterAggregates::default());
        assert!(changed);
        assert_eq!(legacy.rating, Some(0.0));
        assert_eq!(legacy.review_count, Some(7));
        assert_eq!(legacy.completed_orders, Some(0));
        assert!(!legacy.is_incomplete());
    }

    #[rstest]
    fn repair_of_complete_row_reports_no_change() {
        let mut row = StoredMasterProfile {
            user_id: UserId::random(),
            rating: Some(4.5),
            review_count: Some(2),
            completed_orders: Some(3),
        };
        let before = row.clone();
        assert!(!row.repair(&MasterAggregates::default()));
        assert_eq!(row, before);
    }

    #[rstest]
    fn profile_view_substitutes_defaults(legacy: StoredMasterProfile) {
        let profile = legacy.to_profile(&MasterAggregates::default());
        assert_eq!(profile.rating(), 0.0);
        assert_eq!(profile.review_count(), 7);
        assert_eq!(profile.completed_orders(), 0);
    }

    #[rstest]
    #[case(7.5, MAX_RATING)]
    #[case(-1.0, 0.0)]
    #[case(f64::NAN, 0.0)]
    fn rating_is_clamped(#[case] raw: f64, #[case] expected: f64) {
        let profile = MasterProfile::with_aggregates(
            UserId::random(),
            MasterAggregates {
                rating: raw,
                ..MasterAggregates::default()
            },
        );
        assert_eq!(profile.rating(), expected);
    }
}
