//! Presence aggregator: the parent-facing join over all child
//! sessions of one account.
//!
//! Read-only — derives per-child status entries and the family
//! narrative from the store without mutating anything. Staleness up
//! to one poll interval is acceptable; callers poll.

use chrono::{DateTime, Utc};

use kintrack_core::display;
use kintrack_core::types::{ChildStatus, SessionRole};

use crate::store::SessionStore;

/// Per-child presence entries for an account. Only active child
/// sessions appear; ownership/authorization is checked by the caller's
/// outer layer before this is invoked.
pub fn children_status<S: SessionStore>(
    store: &S,
    account_id: &str,
    now: DateTime<Utc>,
) -> Vec<ChildStatus> {
    store
        .list_account(account_id)
        .iter()
        .filter(|r| r.role == SessionRole::Child && r.is_active)
        .map(|r| display::child_status(r, now))
        .collect()
}

/// Aggregate narrative for an account's children.
pub fn family_narrative<S: SessionStore>(
    store: &S,
    account_id: &str,
    now: DateTime<Utc>,
) -> String {
    display::narrative(&children_status(store, account_id, now), now)
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SessionStore};
    use chrono::TimeZone;
    use kintrack_core::types::{SessionRecord, SessionRole};

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn family_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .register(SessionRecord::new("parent-1", "acc-1", "Marie", SessionRole::Parent))
            .expect("register");
        for (id, name) in [("child-1", "Emma"), ("child-2", "Lucas"), ("child-3", "Noah")] {
            store
                .register(SessionRecord::new(id, "acc-1", name, SessionRole::Child))
                .expect("register");
        }
        store
    }

    #[test]
    fn two_online_one_never_connected() {
        // Scenario E: two children online, one never logged in.
        let mut store = family_store();
        store.open_session("child-1", at(0)).expect("open");
        store.open_session("child-2", at(9 * 60_000)).expect("open");

        let now = at(12 * 60_000);
        let statuses = children_status(&store, "acc-1", now);
        assert_eq!(statuses.len(), 3);

        let online: Vec<&ChildStatus> = statuses.iter().filter(|s| s.is_online).collect();
        assert_eq!(online.len(), 2);

        let never = statuses.iter().find(|s| s.name == "Noah").expect("Noah");
        assert!(!never.is_online);
        assert_eq!(never.last_login_at, None);
        assert_eq!(
            kintrack_core::display::last_seen_phrase(never.last_login_at, now),
            "never connected"
        );
    }

    #[test]
    fn parent_session_is_excluded() {
        let mut store = family_store();
        store.open_session("parent-1", at(0)).expect("open");
        let statuses = children_status(&store, "acc-1", at(60_000));
        assert!(statuses.iter().all(|s| s.session_id.starts_with("child-")));
    }

    #[test]
    fn deactivated_child_is_excluded() {
        let mut store = family_store();
        store.set_active("child-3", false).expect("set_active");
        let statuses = children_status(&store, "acc-1", at(0));
        assert_eq!(statuses.len(), 2);
    }

    #[test]
    fn other_accounts_are_invisible() {
        let store = family_store();
        assert!(children_status(&store, "acc-2", at(0)).is_empty());
    }

    #[test]
    fn recency_window_flips_badge_without_transition() {
        let mut store = family_store();
        store.open_session("child-1", at(0)).expect("open");

        // Past the 30-minute window the badge is offline even though
        // the authoritative record is still ONLINE.
        let statuses = children_status(&store, "acc-1", at(31 * 60_000));
        let emma = statuses.iter().find(|s| s.name == "Emma").expect("Emma");
        assert!(!emma.is_online);
        assert!(store.get("child-1").expect("record").is_online());
    }

    #[test]
    fn narrative_for_mixed_family() {
        let mut store = family_store();
        store.open_session("child-1", at(0)).expect("open");
        store.open_session("child-2", at(9 * 60_000)).expect("open");

        let text = family_narrative(&store, "acc-1", at(12 * 60_000));
        assert_eq!(
            text,
            "2 children online: Emma (12 min), Lucas (3 min). \
             1 child offline: Noah (never connected)."
        );
    }

    #[test]
    fn aggregation_never_mutates() {
        let mut store = family_store();
        store.open_session("child-1", at(0)).expect("open");
        let before = store.list_account("acc-1");
        let _ = children_status(&store, "acc-1", at(60_000));
        let _ = family_narrative(&store, "acc-1", at(60_000));
        assert_eq!(store.list_account("acc-1"), before);
    }
}
