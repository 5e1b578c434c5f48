//! Orphan reaper: reclaims sessions whose client never sent a
//! disconnect (crash, killed process, network partition at unload).
//!
//! Uses the exact same conditional OFFLINE transition as a normal
//! disconnect, so a sweep racing a legitimate disconnect folds the
//! accumulator at most once — whoever wins the compare-and-set
//! performs the fold, the loser no-ops. Safe to run concurrently with
//! itself for the same reason.
//!
//! Fold policy: the credited time is clamped to `max_age_ms` (see
//! DESIGN.md) so a session swept hours after its client died is not
//! credited with hours of idle time.

use chrono::{DateTime, Utc};

use kintrack_core::presence;
use kintrack_core::types::{KintrackError, ReapSummary};

use crate::store::SessionStore;

/// Force-close every ONLINE session whose interval started more than
/// `max_age_ms` ago. Returns the number of sessions closed.
pub fn reap_orphans<S: SessionStore>(
    store: &mut S,
    max_age_ms: u64,
    now: DateTime<Utc>,
) -> Result<ReapSummary, KintrackError> {
    let mut closed_count = 0;

    for record in store.list_online() {
        if !presence::is_orphaned(&record, max_age_ms, now) {
            continue;
        }
        // The record snapshot gives us the start time to key the CAS on.
        let Some(start) = record.current_session_start else {
            continue;
        };
        match store.close_if_started_at(&record.session_id, start, now, Some(max_age_ms))? {
            Some(folded_ms) => {
                closed_count += 1;
                tracing::info!(
                    session_id = %record.session_id,
                    folded_ms,
                    "force-closed orphaned session"
                );
            }
            // A disconnect landed between the scan and the close.
            None => tracing::debug!(session_id = %record.session_id, "orphan close raced"),
        }
    }

    if closed_count > 0 {
        tracing::info!(closed_count, "orphan sweep complete");
    }
    Ok(ReapSummary { closed_count })
}

// ─── Tests ────────────────────────────────────────────────────────
