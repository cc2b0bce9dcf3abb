#[cfg(any(test, feature = "test-util"))]
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::errors::InternalError;

/// Source of the current time and of unique identifiers
///
/// Injected everywhere expiry is computed so tests can move time explicitly.
pub trait ClockProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Unique identifier (UUID v4, simple form) used for `jti` and row ids
    fn unique_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    fn timestamp(&self) -> i64 {
        self.now().timestamp()
    }

    /// Unix timestamp `ttl` from now
    ///
    /// Fails instead of overflowing when the instant is not representable.
    fn expiry_timestamp(&self, ttl: chrono::Duration) -> Result<i64, InternalError> {
        self.now()
            .checked_add_signed(ttl)
            .map(|at| at.timestamp())
            .ok_or_else(|| InternalError::expiry_out_of_range(ttl))
    }
}

/// Production clock backed by the system time
pub struct SystemClock;

impl ClockProvider for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for deterministic expiry tests
///
/// Test double, available to dependents through the `test-util` feature.
#[cfg(any(test, feature = "test-util"))]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

#[cfg(any(test, feature = "test-util"))]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.lock() = instant;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        // A poisoned clock still holds a valid instant
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(any(test, feature = "test-util"))]
impl ClockProvider for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}
