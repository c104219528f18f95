//! Cache validity policy
//!
//! Decides whether a cached feed snapshot is still fresh enough to be served.

use chrono::{DateTime, Duration, Utc};

/// Maximum age of a cached feed in days
const MAX_CACHE_AGE_DAYS: i64 = 7;

/// Pure freshness rule for cached feeds
///
/// A snapshot is valid while `now < timestamp + 7 days`. A snapshot written
/// exactly seven days ago is already expired.
pub struct FeedCachePolicy;

impl FeedCachePolicy {
    /// Returns the maximum age a cached feed may reach before it expires
    pub fn max_cache_age() -> Duration {
        Duration::days(MAX_CACHE_AGE_DAYS)
    }

    /// Returns true if a snapshot written at `timestamp` is still valid at `against`
    ///
    /// Timestamps too close to the end of the representable range to add the
    /// max age to are treated as expired.
    pub fn validate(timestamp: DateTime<Utc>, against: DateTime<Utc>) -> bool {
        match timestamp.checked_add_signed(Self::max_cache_age()) {
            Some(max_age) => against < max_age,
            None => false,
        }
    }
}
