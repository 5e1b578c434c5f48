//! Local broadcast channel: how sibling tabs of the same session see
//! each other's activity and logout signals without a server round trip.
//!
//! The mechanism is abstracted behind [`LocalBroadcast`] so the
//! backing medium (storage events, a native broadcast primitive, an
//! in-process hub for tests) is swappable without touching the
//! monitor or coordinator logic. This is a best-effort channel: no
//! atomicity, no ordering guarantee beyond "delivered after publish",
//! and duplicate deliveries must be tolerated by consumers.

use std::sync::{Arc, Mutex, PoisonError};

/// Shared key carrying the last-activity timestamp (epoch ms as text).
pub const ACTIVITY_KEY: &str = "kintrack:lastActivity";

/// Shared key carrying the forced-logout marker (epoch ms as text).
pub const LOGOUT_KEY: &str = "kintrack:logout";

/// One key change observed on the shared channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMessage {
    pub key: String,
    pub value: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    /// The shared medium refused the write (quota denial, private
    /// browsing). Callers degrade to single-tab behavior.
    #[error("local broadcast unavailable: {0}")]
    Unavailable(String),
}

/// Publish/drain seam over the shared per-origin channel.
pub trait LocalBroadcast {
    /// Write a key. Visible to sibling handles, not echoed back to self.
    fn publish(&mut self, key: &str, value: &str) -> Result<(), BroadcastError>;

    /// Drain changes published by siblings since the last drain.
    fn drain(&mut self) -> Vec<BroadcastMessage>;
}

// ─── In-Process Hub ──────────────────────────────────────────────

struct HubEntry {
    origin: u64,
    message: BroadcastMessage,
}

struct HubInner {
    log: Vec<HubEntry>,
    next_origin: u64,
}

/// In-process broadcast hub: every [`handle`](InProcessHub::handle)
/// behaves like one tab. Backs tests and the tab simulation.
#[derive(Clone)]
pub struct InProcessHub {
    inner: Arc<Mutex<HubInner>>,
}

impl InProcessHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner {
                log: Vec::new(),
                next_origin: 0,
            })),
        }
    }

    /// Create a handle for one tab.
    pub fn handle(&self) -> InProcessHandle {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let origin = inner.next_origin;
        inner.next_origin += 1;
        // New handles start at the current end of the log: a freshly
        // opened tab does not replay history.
        let cursor = inner.log.len();
        InProcessHandle {
            hub: Arc::clone(&self.inner),
            origin,
            cursor,
        }
    }
}

impl Default for InProcessHub {
    fn default() -> Self {
        Self::new()
    }
}

/// One tab's view of the hub.
pub struct InProcessHandle {
    hub: Arc<Mutex<HubInner>>,
    origin: u64,
    cursor: usize,
}

impl LocalBroadcast for InProcessHandle {
    fn publish(&mut self, key: &str, value: &str) -> Result<(), BroadcastError> {
        let mut inner = self.hub.lock().unwrap_or_else(PoisonError::into_inner);
        inner.log.push(HubEntry {
            origin: self.origin,
            message: BroadcastMessage {
                key: key.to_owned(),
                value: value.to_owned(),
            },
        });
        Ok(())
    }

    fn drain(&mut self) -> Vec<BroadcastMessage> {
        let inner = self.hub.lock().unwrap_or_else(PoisonError::into_inner);
        let messages = inner.log[self.cursor..]
            .iter()
            .filter(|e| e.origin != self.origin)
            .map(|e| e.message.clone())
            .collect();
        self.cursor = inner.log.len();
        messages
    }
}

// ─── Degraded Channel ────────────────────────────────────────────

/// A channel whose medium is unavailable: every publish fails and
/// nothing is ever delivered. Each tab still works on its own monitor
/// and status client.
pub struct UnavailableBroadcast;

impl LocalBroadcast for UnavailableBroadcast {
    fn publish(&mut self, _key: &str, _value: &str) -> Result<(), BroadcastError> {
        Err(BroadcastError::Unavailable("storage denied".to_owned()))
    }

    fn drain(&mut self) -> Vec<BroadcastMessage> {
        Vec::new()
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_reaches_sibling_not_self() {
        let hub = InProcessHub::new();
        let mut a = hub.handle();
        let mut b = hub.handle();

        a.publish(ACTIVITY_KEY, "1000").expect("publish");

        assert!(a.drain().is_empty(), "no self-echo");
        let seen = b.drain();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].key, ACTIVITY_KEY);
        assert_eq!(seen[0].value, "1000");
    }

    #[test]
    fn drain_is_cursor_based() {
        let hub = InProcessHub::new();
        let mut a = hub.handle();
        let mut b = hub.handle();

        a.publish(ACTIVITY_KEY, "1").expect("publish");
        assert_eq!(b.drain().len(), 1);
        assert!(b.drain().is_empty(), "already drained");

        a.publish(LOGOUT_KEY, "2").expect("publish");
        let seen = b.drain();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].key, LOGOUT_KEY);
    }

    #[test]
    fn late_handle_skips_history() {
        let hub = InProcessHub::new();
        let mut a = hub.handle();
        a.publish(ACTIVITY_KEY, "1").expect("publish");

        let mut late = hub.handle();
        assert!(late.drain().is_empty());

        a.publish(ACTIVITY_KEY, "2").expect("publish");
        assert_eq!(late.drain().len(), 1);
    }

    #[test]
    fn three_tabs_all_see_each_other() {
        let hub = InProcessHub::new();
        let mut a = hub.handle();
        let mut b = hub.handle();
        let mut c = hub.handle();

        a.publish(ACTIVITY_KEY, "1").expect("publish");
        b.publish(ACTIVITY_KEY, "2").expect("publish");

        assert_eq!(a.drain().len(), 1); // b's message only
        assert_eq!(b.drain().len(), 1); // a's message only
        assert_eq!(c.drain().len(), 2); // both
    }

    #[test]
    fn unavailable_channel_fails_publish_quietly() {
        let mut ch = UnavailableBroadcast;
        assert!(ch.publish(ACTIVITY_KEY, "1").is_err());
        assert!(ch.drain().is_empty());
    }
}
