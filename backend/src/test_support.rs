//! Test utilities shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for `cfg(test)` and with the `test-support` feature.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::outbound::security::{BcryptPasswordHasher, MIN_BCRYPT_COST};

/// Clock whose current instant is set by the test.
#[derive(Debug, Clone)]
pub struct MutableClock(Arc<Mutex<DateTime<Utc>>>);

impl MutableClock {
    /// Clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(now)))
    }

    /// Clock frozen at 2024-06-01 12:00 UTC.
    pub fn fixed() -> Self {
        Self::new(fixture_instant())
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: TimeDelta) {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        *guard += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Instant used by [`MutableClock::fixed`].
pub fn fixture_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Hasher with the minimum bcrypt cost so tests stay fast.
pub fn fast_hasher() -> BcryptPasswordHasher {
    BcryptPasswordHasher::with_cost(MIN_BCRYPT_COST)
}
