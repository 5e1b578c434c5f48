//! Presence transitions: the ONLINE/OFFLINE state machine over a
//! [`SessionRecord`].
//!
//! Pure functions with injected time. The OFFLINE transition is
//! expressed as a conditional update keyed on the observed start time
//! ([`close_if_started_at`]), so two racing disconnect-equivalent
//! callers fold the accumulator at most once: the loser observes a
//! changed (or cleared) start time and no-ops.

use chrono::{DateTime, Utc};

use crate::types::SessionRecord;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default orphan threshold: a session ONLINE longer than this with no
/// disconnect signal is considered abandoned (milliseconds).
pub const DEFAULT_MAX_SESSION_AGE_MS: u64 = 30 * 60 * 1000;

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Open an ONLINE interval. Returns `true` if the record transitioned.
///
/// Idempotent: a session that is already ONLINE is left untouched —
/// the start time is NOT reset and `last_login_at` is NOT refreshed.
pub fn connect(record: &mut SessionRecord, now: DateTime<Utc>) -> bool {
    if record.is_online() {
        return false;
    }
    record.current_session_start = Some(now);
    record.last_login_at = Some(now);
    true
}

/// Close the ONLINE interval. Returns the folded duration in
/// milliseconds, or `None` if the session was already OFFLINE.
pub fn disconnect(record: &mut SessionRecord, now: DateTime<Utc>) -> Option<u64> {
    let start = record.current_session_start?;
    close_if_started_at(record, start, now, None)
}

/// Conditional OFFLINE transition: fold the interval into the
/// accumulator only if the record's start time still equals
/// `expected_start`. Returns the folded duration on success.
///
/// `cap_ms` clamps the folded amount (used by the orphan reaper; see
/// DESIGN.md). A negative elapsed time folds as zero — the server
/// clock is the sole authority, so this only guards clock steps.
pub fn close_if_started_at(
    record: &mut SessionRecord,
    expected_start: DateTime<Utc>,
    now: DateTime<Utc>,
    cap_ms: Option<u64>,
) -> Option<u64> {
    if record.current_session_start != Some(expected_start) {
        return None;
    }

    let elapsed = now
        .signed_duration_since(expected_start)
        .num_milliseconds()
        .max(0) as u64;
    let folded = match cap_ms {
        Some(cap) => elapsed.min(cap),
        None => elapsed,
    };

    record.total_connected_ms = record.total_connected_ms.saturating_add(folded);
    record.current_session_start = None;
    Some(folded)
}

/// Whether the reaper should force-close this session at `now`.
pub fn is_orphaned(record: &SessionRecord, max_age_ms: u64, now: DateTime<Utc>) -> bool {
    match record.current_session_start {
        Some(start) => {
            let age = now.signed_duration_since(start).num_milliseconds();
            age > max_age_ms as i64
        }
        None => false,
    }
}

// ─── Tests ────────────────────────────────────────────────────────
