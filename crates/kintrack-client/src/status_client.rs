//! Session status client: the single chokepoint between local intent
//! and the network.
//!
//! Holds a last-known-online belief distinct from server truth and
//! coalesces disconnect bursts into one outbound call. Pure state
//! machine with injected time; the runtime layer performs the actual
//! network calls for the intents this module emits.

use chrono::{DateTime, TimeDelta, Utc};

/// Coalescing window for disconnect signals (milliseconds).
pub const DISCONNECT_COALESCE_MS: u64 = 1_000;

/// Outbound call the runtime should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIntent {
    Connect,
    Disconnect,
}

/// Local online/offline belief plus the pending coalesced disconnect.
#[derive(Debug, Clone)]
pub struct StatusClient {
    known_online: bool,
    coalesce_ms: u64,
    pending_disconnect_at: Option<DateTime<Utc>>,
}

impl StatusClient {
    pub fn new(initially_online: bool) -> Self {
        Self {
            known_online: initially_online,
            coalesce_ms: DISCONNECT_COALESCE_MS,
            pending_disconnect_at: None,
        }
    }

    pub fn with_coalesce_ms(mut self, coalesce_ms: u64) -> Self {
        self.coalesce_ms = coalesce_ms;
        self
    }

    /// Signal "I am now online". Sent immediately — re-entering a page
    /// must reflect as online without delay. No-op when already known
    /// online. A connect cancels any pending coalesced disconnect.
    pub fn signal_connect(&mut self) -> Option<StatusIntent> {
        if self.known_online {
            return None;
        }
        self.known_online = true;
        self.pending_disconnect_at = None;
        Some(StatusIntent::Connect)
    }

    /// Signal "I am now offline". Flips the local belief immediately
    /// but defers the network call by the coalescing window; a trigger
    /// arriving while one is pending replaces it rather than queueing
    /// a second call.
    pub fn signal_disconnect(&mut self, now: DateTime<Utc>) {
        if !self.known_online && self.pending_disconnect_at.is_none() {
            return;
        }
        self.known_online = false;
        self.pending_disconnect_at = Some(now + TimeDelta::milliseconds(self.coalesce_ms as i64));
    }

    /// Emit the deferred disconnect once its window has elapsed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<StatusIntent> {
        match self.pending_disconnect_at {
            Some(due) if now >= due => {
                self.pending_disconnect_at = None;
                Some(StatusIntent::Disconnect)
            }
            _ => None,
        }
    }

    /// Adopt server truth (startup reconciliation read): handles the
    /// reaper having closed the session while the tab was suspended.
    pub fn reconcile(&mut self, server_online: bool) {
        self.known_online = server_online;
        self.pending_disconnect_at = None;
    }

    pub fn known_online(&self) -> bool {
        self.known_online
    }

    /// When the pending coalesced disconnect is due, if any.
    pub fn pending_disconnect_at(&self) -> Option<DateTime<Utc>> {
        self.pending_disconnect_at
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    // ── Connect ─────────────────────────────────────────────────

    #[test]
    fn connect_when_offline_sends_immediately() {
        let mut c = StatusClient::new(false);
        assert_eq!(c.signal_connect(), Some(StatusIntent::Connect));
        assert!(c.known_online());
    }

    #[test]
    fn connect_when_already_online_is_noop() {
        let mut c = StatusClient::new(true);
        assert_eq!(c.signal_connect(), None);
    }

    // ── Disconnect coalescing ───────────────────────────────────

    #[test]
    fn disconnect_is_deferred_by_window() {
        let mut c = StatusClient::new(true);
        c.signal_disconnect(at(0));
        assert!(!c.known_online(), "local belief flips immediately");
        assert_eq!(c.poll(at(999)), None);
        assert_eq!(c.poll(at(1_000)), Some(StatusIntent::Disconnect));
        assert_eq!(c.poll(at(2_000)), None, "emitted once");
    }

    #[test]
    fn burst_of_disconnect_triggers_yields_one_call() {
        // Tab hidden + window blur + beforeunload firing together.
        let mut c = StatusClient::new(true);
        c.signal_disconnect(at(0));
        c.signal_disconnect(at(100));
        c.signal_disconnect(at(200));

        assert_eq!(c.poll(at(1_000)), None, "window restarted by later trigger");
        assert_eq!(c.poll(at(1_200)), Some(StatusIntent::Disconnect));
        assert_eq!(c.poll(at(5_000)), None);
    }

    #[test]
    fn disconnect_when_already_offline_is_noop() {
        let mut c = StatusClient::new(false);
        c.signal_disconnect(at(0));
        assert_eq!(c.poll(at(10_000)), None);
    }

    #[test]
    fn reconnect_within_window_cancels_pending_disconnect() {
        let mut c = StatusClient::new(true);
        c.signal_disconnect(at(0));
        assert_eq!(c.signal_connect(), Some(StatusIntent::Connect));
        assert_eq!(c.poll(at(10_000)), None, "stale disconnect never sent");
        assert!(c.known_online());
    }

    // ── Reconciliation ──────────────────────────────────────────

    #[test]
    fn reconcile_adopts_server_truth() {
        // Reaper closed the session while the tab was suspended: the
        // tab believed online, the server says offline.
        let mut c = StatusClient::new(true);
        c.reconcile(false);
        assert!(!c.known_online());
        // The next connect is therefore not deduplicated away.
        assert_eq!(c.signal_connect(), Some(StatusIntent::Connect));
    }

    #[test]
    fn custom_coalesce_window() {
        let mut c = StatusClient::new(true).with_coalesce_ms(50);
        c.signal_disconnect(at(0));
        assert_eq!(c.poll(at(49)), None);
        assert_eq!(c.poll(at(50)), Some(StatusIntent::Disconnect));
    }
}
