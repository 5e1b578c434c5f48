//! Session store: the persisted record per session and the
//! conditional updates the presence operations are built on.
//!
//! The OFFLINE-transition math lives behind
//! [`SessionStore::close_if_started_at`], a compare-and-set keyed on
//! the previously observed start time. Whichever caller wins performs
//! the fold; the loser observes `None` and no-ops. That keeps the
//! accumulator exactly-once per interval regardless of how callers
//! interleave.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use kintrack_core::presence;
use kintrack_core::types::{KintrackError, SessionRecord};

/// Storage seam for session records. Persistence technology is an
/// implementation detail behind this trait.
pub trait SessionStore {
    /// Fetch one record by session id.
    fn get(&self, session_id: &str) -> Option<SessionRecord>;

    /// Create a new record. Fails on a duplicate session id.
    fn register(&mut self, record: SessionRecord) -> Result<(), KintrackError>;

    /// Open an ONLINE interval at `now`. Returns `false` when the
    /// session was already ONLINE (idempotent connect).
    fn open_session(&mut self, session_id: &str, now: DateTime<Utc>)
    -> Result<bool, KintrackError>;

    /// Conditional OFFLINE transition: folds the interval into the
    /// accumulator only if the start time still equals
    /// `expected_start`. Returns the folded milliseconds on success,
    /// `None` when another caller already closed (or reopened) the
    /// interval.
    fn close_if_started_at(
        &mut self,
        session_id: &str,
        expected_start: DateTime<Utc>,
        now: DateTime<Utc>,
        cap_ms: Option<u64>,
    ) -> Result<Option<u64>, KintrackError>;

    /// All records belonging to an account.
    fn list_account(&self, account_id: &str) -> Vec<SessionRecord>;

    /// All records currently ONLINE (reaper input).
    fn list_online(&self) -> Vec<SessionRecord>;
}

// ─── In-Memory Store ─────────────────────────────────────────────

/// HashMap-backed store. The daemon serializes access through one
/// lock; the conditional close makes re-entrant sweeps idempotent
/// even without it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<String, SessionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Administrative enable/disable. Not part of [`SessionStore`]:
    /// presence logic never touches this flag.
    pub fn set_active(&mut self, session_id: &str, is_active: bool) -> Result<(), KintrackError> {
        let record = self
            .records
            .get_mut(session_id)
            .ok_or_else(|| KintrackError::UnknownSession(session_id.to_owned()))?;
        record.is_active = is_active;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, session_id: &str) -> Option<SessionRecord> {
        self.records.get(session_id).cloned()
    }

    fn register(&mut self, record: SessionRecord) -> Result<(), KintrackError> {
        if self.records.contains_key(&record.session_id) {
            return Err(KintrackError::DuplicateSession(record.session_id));
        }
        self.records.insert(record.session_id.clone(), record);
        Ok(())
    }

    fn open_session(
        &mut self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, KintrackError> {
        let record = self
            .records
            .get_mut(session_id)
            .ok_or_else(|| KintrackError::UnknownSession(session_id.to_owned()))?;
        Ok(presence::connect(record, now))
    }

    fn close_if_started_at(
        &mut self,
        session_id: &str,
        expected_start: DateTime<Utc>,
        now: DateTime<Utc>,
        cap_ms: Option<u64>,
    ) -> Result<Option<u64>, KintrackError> {
        let record = self
            .records
            .get_mut(session_id)
            .ok_or_else(|| KintrackError::UnknownSession(session_id.to_owned()))?;
        Ok(presence::close_if_started_at(record, expected_start, now, cap_ms))
    }

    fn list_account(&self, account_id: &str) -> Vec<SessionRecord> {
        let mut records: Vec<SessionRecord> = self
            .records
            .values()
            .filter(|r| r.account_id == account_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        records
    }

    fn list_online(&self) -> Vec<SessionRecord> {
        let mut records: Vec<SessionRecord> = self
            .records
            .values()
            .filter(|r| r.is_online())
            .cloned()
            .collect();
        records.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        records
    }
}

// ─── Tests ────────────────────────────────────────────────────────
