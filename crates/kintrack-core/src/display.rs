//! Derived presence views: recency policy, duration formatting, and
//! the parent-facing narrative.
//!
//! Everything here is presentation over the authoritative record —
//! nothing in this module mutates state or performs a transition.

use chrono::{DateTime, Utc};

use crate::types::{ChildStatus, PresenceStatus, SessionRecord};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Recency window for the displayed "online" badge (milliseconds).
/// A session whose interval started longer ago than this is shown
/// offline even though the authoritative state may still be ONLINE
/// until the reaper sweeps it.
pub const ONLINE_RECENCY_WINDOW_MS: i64 = 30 * 60 * 1000;

// ---------------------------------------------------------------------------
// Recency policy
// ---------------------------------------------------------------------------

/// Displayed-online check: authoritative ONLINE, administratively
/// active, and the interval started within the recency window.
pub fn is_displayed_online(record: &SessionRecord, now: DateTime<Utc>) -> bool {
    if !record.is_active {
        return false;
    }
    match record.current_session_start {
        Some(start) => {
            now.signed_duration_since(start).num_milliseconds() < ONLINE_RECENCY_WINDOW_MS
        }
        None => false,
    }
}

/// Live elapsed time of the current interval in milliseconds.
pub fn current_session_ms(record: &SessionRecord, now: DateTime<Utc>) -> Option<u64> {
    record
        .current_session_start
        .map(|start| now.signed_duration_since(start).num_milliseconds().max(0) as u64)
}

// ---------------------------------------------------------------------------
// Status builders
// ---------------------------------------------------------------------------

/// Read-only status for one session (authoritative state, live elapsed).
///
/// A deactivated session reports OFFLINE regardless of its record.
pub fn status_of(record: &SessionRecord, now: DateTime<Utc>) -> PresenceStatus {
    let is_online = record.is_active && record.is_online();
    PresenceStatus {
        is_online,
        current_session_duration_ms: if is_online {
            current_session_ms(record, now)
        } else {
            None
        },
        total_connection_duration_ms: record.total_connected_ms,
        last_login_at: record.last_login_at,
    }
}

/// One child's aggregate entry. Uses the recency policy for the
/// online badge, unlike [`status_of`] which reports authoritative state.
pub fn child_status(record: &SessionRecord, now: DateTime<Utc>) -> ChildStatus {
    let is_online = is_displayed_online(record, now);
    ChildStatus {
        session_id: record.session_id.clone(),
        name: record.display_name.clone(),
        is_online,
        current_session_duration_ms: if is_online {
            current_session_ms(record, now)
        } else {
            None
        },
        total_connection_duration_ms: record.total_connected_ms,
        last_login_at: record.last_login_at,
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Human-readable duration: `2d 4h`, `3h 12min`, `5min`, `42s`, `0min`.
pub fn format_duration_ms(ms: u64) -> String {
    if ms == 0 {
        return "0min".to_owned();
    }
    let seconds = ms / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{days}d {}h", hours % 24)
    } else if hours > 0 {
        format!("{hours}h {}min", minutes % 60)
    } else if minutes > 0 {
        format!("{minutes}min")
    } else {
        format!("{seconds}s")
    }
}

/// "last seen N days ago" phrasing with the never-connected fallback.
pub fn last_seen_phrase(last_login_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match last_login_at {
        Some(last) => {
            let days = now.signed_duration_since(last).num_days().max(0);
            match days {
                0 => "last seen today".to_owned(),
                1 => "last seen 1 day ago".to_owned(),
                n => format!("last seen {n} days ago"),
            }
        }
        None => "never connected".to_owned(),
    }
}

/// Aggregate narrative for a set of children, e.g.
/// `2 children online: Emma (12 min), Lucas (3 min). 1 child offline:
/// Noah (last seen 4 days ago).`
pub fn narrative(children: &[ChildStatus], now: DateTime<Utc>) -> String {
    if children.is_empty() {
        return "no children registered".to_owned();
    }

    let online: Vec<&ChildStatus> = children.iter().filter(|c| c.is_online).collect();
    let offline: Vec<&ChildStatus> = children.iter().filter(|c| !c.is_online).collect();

    let mut out = String::new();

    if !online.is_empty() {
        let noun = if online.len() == 1 { "child" } else { "children" };
        let list = online
            .iter()
            .map(|c| {
                let mins = c.current_session_duration_ms.unwrap_or(0) / 60_000;
                format!("{} ({mins} min)", c.name)
            })
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("{} {noun} online: {list}.", online.len()));
    }

    if !offline.is_empty() {
        if !out.is_empty() {
            out.push(' ');
        }
        let noun = if offline.len() == 1 { "child" } else { "children" };
        let list = offline
            .iter()
            .map(|c| format!("{} ({})", c.name, last_seen_phrase(c.last_login_at, now)))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("{} {noun} offline: {list}.", offline.len()));
    }

    out
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presence::connect;
    use crate::types::SessionRole;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn online_record(start_ms: i64) -> SessionRecord {
        let mut r = SessionRecord::new("sess-1", "acc-1", "Emma", SessionRole::Child);
        connect(&mut r, at(start_ms));
        r
    }

    // ── Recency policy ──────────────────────────────────────────

    #[test]
    fn displayed_online_within_window() {
        let r = online_record(0);
        assert!(is_displayed_online(&r, at(29 * 60 * 1000)));
    }

    #[test]
    fn displayed_offline_past_window() {
        let r = online_record(0);
        assert!(!is_displayed_online(&r, at(ONLINE_RECENCY_WINDOW_MS)));
    }

    #[test]
    fn deactivated_session_displays_offline() {
        let mut r = online_record(0);
        r.is_active = false;
        assert!(!is_displayed_online(&r, at(1_000)));
    }

    #[test]
    fn offline_record_displays_offline() {
        let r = SessionRecord::new("sess-1", "acc-1", "Emma", SessionRole::Child);
        assert!(!is_displayed_online(&r, at(1_000)));
    }

    // ── Status builders ─────────────────────────────────────────

    #[test]
    fn status_reports_live_elapsed_when_online() {
        let r = online_record(0);
        let status = status_of(&r, at(120_000));
        assert!(status.is_online);
        assert_eq!(status.current_session_duration_ms, Some(120_000));
        assert_eq!(status.total_connection_duration_ms, 0);
    }

    #[test]
    fn status_reads_do_not_mutate() {
        let r = online_record(0);
        let before = r.clone();
        let _ = status_of(&r, at(500_000));
        let _ = child_status(&r, at(500_000));
        assert_eq!(r, before);
    }

    #[test]
    fn status_of_deactivated_is_offline() {
        let mut r = online_record(0);
        r.is_active = false;
        let status = status_of(&r, at(1_000));
        assert!(!status.is_online);
        assert_eq!(status.current_session_duration_ms, None);
    }

    #[test]
    fn status_authoritative_vs_child_recency() {
        // Past the recency window the authoritative status is still
        // ONLINE, but the aggregate badge already shows offline.
        let r = online_record(0);
        let now = at(ONLINE_RECENCY_WINDOW_MS + 1);
        assert!(status_of(&r, now).is_online);
        assert!(!child_status(&r, now).is_online);
    }

    // ── Formatting ──────────────────────────────────────────────

    #[test]
    fn duration_formats() {
        assert_eq!(format_duration_ms(0), "0min");
        assert_eq!(format_duration_ms(42_000), "42s");
        assert_eq!(format_duration_ms(5 * 60_000), "5min");
        assert_eq!(format_duration_ms(3 * 3_600_000 + 12 * 60_000), "3h 12min");
        assert_eq!(format_duration_ms(2 * 86_400_000 + 4 * 3_600_000), "2d 4h");
    }

    #[test]
    fn last_seen_phrases() {
        let now = at(10 * 86_400_000);
        assert_eq!(last_seen_phrase(None, now), "never connected");
        assert_eq!(last_seen_phrase(Some(at(6 * 86_400_000)), now), "last seen 4 days ago");
        assert_eq!(last_seen_phrase(Some(at(9 * 86_400_000)), now), "last seen 1 day ago");
        assert_eq!(
            last_seen_phrase(Some(at(10 * 86_400_000 - 1_000)), now),
            "last seen today"
        );
    }

    // ── Narrative ───────────────────────────────────────────────

    fn child(name: &str, online_mins: Option<u64>, last_login_ms: Option<i64>) -> ChildStatus {
        ChildStatus {
            session_id: format!("sess-{name}"),
            name: name.to_owned(),
            is_online: online_mins.is_some(),
            current_session_duration_ms: online_mins.map(|m| m * 60_000),
            total_connection_duration_ms: 0,
            last_login_at: last_login_ms.map(at),
        }
    }

    #[test]
    fn narrative_mixed() {
        let now = at(10 * 86_400_000);
        let children = vec![
            child("Emma", Some(12), Some(0)),
            child("Lucas", Some(3), Some(0)),
            child("Noah", None, Some(6 * 86_400_000)),
        ];
        assert_eq!(
            narrative(&children, now),
            "2 children online: Emma (12 min), Lucas (3 min). \
             1 child offline: Noah (last seen 4 days ago)."
        );
    }

    #[test]
    fn narrative_never_connected() {
        let now = at(86_400_000);
        let children = vec![child("Noah", None, None)];
        assert_eq!(
            narrative(&children, now),
            "1 child offline: Noah (never connected)."
        );
    }

    #[test]
    fn narrative_empty() {
        assert_eq!(narrative(&[], at(0)), "no children registered");
    }
}
