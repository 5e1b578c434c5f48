//! Inactivity tracking: a single re-armable deadline per tab.
//!
//! Pure, deterministic state machine. All time values are passed in
//! as parameters (no system clock access). The runtime layer owns the
//! actual timer and calls [`InactivityTracker::poll`] when it fires.

use chrono::{DateTime, TimeDelta, Utc};

/// Default inactivity timeout: 10 minutes (milliseconds).
pub const DEFAULT_INACTIVITY_TIMEOUT_MS: u64 = 10 * 60 * 1000;

/// Tracks the last user activity and the single pending deadline.
///
/// Invariant: at most one live deadline at any time — recording
/// activity always replaces the previous one.
#[derive(Debug, Clone)]
pub struct InactivityTracker {
    timeout_ms: u64,
    last_activity: DateTime<Utc>,
    deadline: Option<DateTime<Utc>>,
}

impl InactivityTracker {
    /// Create a tracker armed from `now`.
    pub fn new(timeout_ms: u64, now: DateTime<Utc>) -> Self {
        Self {
            timeout_ms,
            last_activity: now,
            deadline: Some(now + TimeDelta::milliseconds(timeout_ms as i64)),
        }
    }

    /// Create a tracker from a previously stored last-activity value.
    ///
    /// Covers the suspended-tab case: when the stored value already
    /// exceeds the timeout, the deadline is set in the past so the
    /// next [`poll`](Self::poll) fires immediately.
    pub fn resume(timeout_ms: u64, stored_last_activity: DateTime<Utc>, _now: DateTime<Utc>) -> Self {
        Self {
            timeout_ms,
            last_activity: stored_last_activity,
            deadline: Some(stored_last_activity + TimeDelta::milliseconds(timeout_ms as i64)),
        }
    }

    /// Record user activity at `now`: updates the last-activity value
    /// and rearms the deadline, cancelling the previous one.
    pub fn record_activity(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
        self.deadline = Some(now + TimeDelta::milliseconds(self.timeout_ms as i64));
    }

    /// Check for expiry at `now`. Fires at most once per arming:
    /// a fired deadline is consumed and stays quiet until the next
    /// [`record_activity`](Self::record_activity).
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Disarm without firing (tab shutting down).
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// The pending deadline, if armed.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }
}

// ─── Tests ────────────────────────────────────────────────────────
