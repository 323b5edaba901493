//! Per-caller admission control over a sliding one-minute window.
//!
//! Each caller identity owns an ordered window of request timestamps.
//! On every check the window is pruned of entries older than 60 seconds;
//! if the remainder is at the configured maximum the call is denied
//! without recording, otherwise the current instant is appended.
//!
//! The check runs before any network or extraction work, so denied
//! callers never reach the resolver.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Default maximum admitted queries per caller per minute.
pub const DEFAULT_MAX_PER_MINUTE: usize = 10;

/// Length of the trailing admission window.
const WINDOW: Duration = Duration::from_secs(60);

/// Result of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request was recorded and may proceed.
    Admitted,
    /// The caller exceeded the window; nothing was recorded.
    Denied,
}

/// Sliding-window rate limiter keyed by caller identity.
///
/// Designed to be wrapped in `Arc` and shared across concurrent pipeline
/// invocations. Uses `DashMap` for safe first-access insertion of new
/// callers; per-caller windows are independently locked.
#[derive(Debug)]
pub struct RateLimiter {
    max_per_minute: usize,

    /// Per-caller windows of admission timestamps.
    /// Arc lets the shard lock be released before taking the inner
    /// mutex, so a slow caller never blocks its map shard.
    windows: DashMap<i64, Arc<Mutex<VecDeque<Instant>>>>,
}

impl RateLimiter {
    /// Creates a limiter admitting at most `max_per_minute` requests per
    /// caller in any trailing 60-second interval.
    #[must_use]
    pub fn new(max_per_minute: usize) -> Self {
        Self {
            max_per_minute,
            windows: DashMap::new(),
        }
    }

    /// Returns the configured per-caller maximum.
    #[must_use]
    pub fn max_per_minute(&self) -> usize {
        self.max_per_minute
    }

    /// Checks whether `caller_id` may proceed right now, recording the
    /// request on admission.
    #[instrument(skip(self))]
    pub fn check_and_record(&self, caller_id: i64) -> Admission {
        let now = Instant::now();

        let window = self
            .windows
            .entry(caller_id)
            .or_insert_with(|| Arc::new(Mutex::new(VecDeque::new())))
            .clone();

        let mut window = window.lock().unwrap_or_else(PoisonError::into_inner);

        // Lazy pruning: drop everything outside the trailing window.
        while window
            .front()
            .is_some_and(|t| now.duration_since(*t) >= WINDOW)
        {
            window.pop_front();
        }

        if window.len() >= self.max_per_minute {
            debug!(caller_id, in_window = window.len(), "caller denied");
            return Admission::Denied;
        }

        window.push_back(now);
        Admission::Admitted
    }

    /// Drops callers whose windows are empty after pruning, returning
    /// the number removed.
    ///
    /// Callers are never evicted by `check_and_record`, so long-running
    /// deployments should call this periodically to bound the map.
    pub fn sweep_idle(&self) -> usize {
        let now = Instant::now();
        // Counted inside the closure: new callers can be inserted
        // concurrently, so before/after map sizes don't subtract safely.
        let mut removed = 0;
        self.windows.retain(|_, window| {
            let window = window.lock().unwrap_or_else(PoisonError::into_inner);
            let live = window.iter().any(|t| now.duration_since(*t) < WINDOW);
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    /// Number of caller identities currently tracked.
    #[must_use]
    pub fn tracked_callers(&self) -> usize {
        self.windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PER_MINUTE)
    }
}
