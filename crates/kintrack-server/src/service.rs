//! Presence service: connect / disconnect / status over a
//! [`SessionStore`].
//!
//! An explicit service object with an injected store dependency — no
//! module-level shared state. Both operations are idempotent and safe
//! to retry; a disconnect that loses the race against the reaper (or
//! another disconnect) is a silent no-op.

use chrono::{DateTime, Utc};

use kintrack_core::display;
use kintrack_core::types::{KintrackError, PresenceStatus, SessionRecord, SignalAck};

use crate::store::SessionStore;

pub struct PresenceService<S: SessionStore> {
    store: S,
}

impl<S: SessionStore> PresenceService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Mark the session ONLINE at `now`. Idempotent: a session that is
    /// already ONLINE keeps its start time.
    pub fn connect(&mut self, session_id: &str, now: DateTime<Utc>) -> Result<SignalAck, KintrackError> {
        let opened = self.store.open_session(session_id, now)?;
        if opened {
            tracing::debug!(session_id, "session connected");
        }
        Ok(SignalAck {
            is_online: true,
            last_activity: now,
        })
    }

    /// Mark the session OFFLINE at `now`, folding the closed interval
    /// into the accumulator. No-op when already OFFLINE.
    pub fn disconnect(
        &mut self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SignalAck, KintrackError> {
        let record = self
            .store
            .get(session_id)
            .ok_or_else(|| KintrackError::UnknownSession(session_id.to_owned()))?;

        if let Some(start) = record.current_session_start {
            match self.store.close_if_started_at(session_id, start, now, None)? {
                Some(folded_ms) => {
                    tracing::debug!(session_id, folded_ms, "session disconnected");
                }
                // Lost the race against a concurrent close.
                None => tracing::debug!(session_id, "disconnect raced, already closed"),
            }
        }

        Ok(SignalAck {
            is_online: false,
            last_activity: now,
        })
    }

    /// Read-only status. Reports the live elapsed time of the current
    /// interval when ONLINE; mutates nothing.
    pub fn status(&self, session_id: &str, now: DateTime<Utc>) -> Result<PresenceStatus, KintrackError> {
        let record = self
            .store
            .get(session_id)
            .ok_or_else(|| KintrackError::UnknownSession(session_id.to_owned()))?;
        Ok(display::status_of(&record, now))
    }

    /// Create a fresh OFFLINE record (registration path).
    pub fn register(&mut self, record: SessionRecord) -> Result<(), KintrackError> {
        let session_id = record.session_id.clone();
        self.store.register(record)?;
        tracing::info!(session_id, "session registered");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

// ─── Tests ────────────────────────────────────────────────────────
