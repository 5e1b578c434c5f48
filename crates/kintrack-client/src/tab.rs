//! One browser tab's presence controller: wires the inactivity
//! tracker, the cross-tab broadcast, and the status client together.
//!
//! Local interaction rearms the tracker and is published for sibling
//! tabs; sibling activity rearms the tracker without a network call;
//! a logout marker from any tab forces this one offline too. Publish
//! failures degrade to single-tab behavior.

use chrono::{DateTime, Utc};

use crate::activity::InactivityTracker;
use crate::broadcast::{ACTIVITY_KEY, LOGOUT_KEY, LocalBroadcast};
use crate::status_client::{StatusClient, StatusIntent};

/// Page/interaction events the host environment feeds in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    /// Pointer movement, key press, scroll, touch, click.
    Interaction,
    /// Page became hidden (tab switched away, window minimized).
    Hidden,
    /// Page became visible or the window regained focus.
    Visible,
}

pub struct TabController<B: LocalBroadcast> {
    tracker: InactivityTracker,
    channel: B,
    status: StatusClient,
    timed_out: bool,
}

impl<B: LocalBroadcast> TabController<B> {
    pub fn new(tracker: InactivityTracker, channel: B, status: StatusClient) -> Self {
        Self {
            tracker,
            channel,
            status,
            timed_out: false,
        }
    }

    /// Feed a host event. Returns the outbound calls now due.
    pub fn on_event(&mut self, event: TabEvent, now: DateTime<Utc>) -> Vec<StatusIntent> {
        let mut intents = Vec::new();
        match event {
            TabEvent::Interaction => self.local_activity(now),
            TabEvent::Hidden => {
                self.status.signal_disconnect(now);
            }
            TabEvent::Visible => {
                self.local_activity(now);
                if let Some(intent) = self.status.signal_connect() {
                    intents.push(intent);
                }
            }
        }
        intents
    }

    /// Periodic tick: drain sibling-tab messages, check the
    /// inactivity deadline, and flush any due coalesced call.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<StatusIntent> {
        for message in self.channel.drain() {
            match message.key.as_str() {
                // Sibling activity counts as local activity; not
                // re-published, so tabs cannot echo forever.
                ACTIVITY_KEY => self.tracker.record_activity(now),
                LOGOUT_KEY => self.force_timeout(now),
                _ => {}
            }
        }

        if self.tracker.poll(now) {
            // Best effort: siblings that miss this still have their
            // own deadlines.
            let _ = self.channel.publish(LOGOUT_KEY, &now.timestamp_millis().to_string());
            self.force_timeout(now);
        }

        let mut intents = Vec::new();
        if let Some(intent) = self.status.poll(now) {
            intents.push(intent);
        }
        intents
    }

    /// Adopt server truth on startup (reconciliation read).
    pub fn reconcile(&mut self, server_online: bool) {
        self.status.reconcile(server_online);
    }

    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn tracker(&self) -> &InactivityTracker {
        &self.tracker
    }

    pub fn status(&self) -> &StatusClient {
        &self.status
    }

    fn local_activity(&mut self, now: DateTime<Utc>) {
        self.timed_out = false;
        self.tracker.record_activity(now);
        let _ = self
            .channel
            .publish(ACTIVITY_KEY, &now.timestamp_millis().to_string());
    }

    /// Idempotent: duplicate logout deliveries are no-ops.
    fn force_timeout(&mut self, now: DateTime<Utc>) {
        if self.timed_out {
            return;
        }
        self.timed_out = true;
        self.tracker.cancel();
        self.status.signal_disconnect(now);
    }
}

// ─── Tests ────────────────────────────────────────────────────────
