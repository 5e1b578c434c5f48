use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Role ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    Parent,
    Child,
}

impl SessionRole {
    pub const ALL: [Self; 2] = [Self::Parent, Self::Child];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Child => "child",
        }
    }
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionRole {
    type Err = KintrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "parent" => Ok(Self::Parent),
            "child" => Ok(Self::Child),
            _ => Err(KintrackError::InvalidRole(s.to_owned())),
        }
    }
}

// ─── Session Record ───────────────────────────────────────────────

/// Authoritative persisted record for one login profile.
///
/// `current_session_start` doubles as the ONLINE/OFFLINE discriminator:
/// it is non-null exactly when the session is ONLINE. The serde field
/// names are a persisted contract other layers depend on bit-exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "accountId")]
    pub account_id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub role: SessionRole,
    #[serde(rename = "lastLoginAt")]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(rename = "currentSessionStartTime")]
    pub current_session_start: Option<DateTime<Utc>>,
    #[serde(rename = "totalConnectionDurationMs")]
    pub total_connected_ms: u64,
    /// Administrative enable/disable flag. Never mutated by presence
    /// logic; an inactive session reports OFFLINE.
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

impl SessionRecord {
    /// Create a fresh OFFLINE record, as registration does.
    pub fn new(
        session_id: impl Into<String>,
        account_id: impl Into<String>,
        display_name: impl Into<String>,
        role: SessionRole,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            account_id: account_id.into(),
            display_name: display_name.into(),
            role,
            last_login_at: None,
            current_session_start: None,
            total_connected_ms: 0,
            is_active: true,
        }
    }

    /// Authoritative ONLINE/OFFLINE state.
    pub fn is_online(&self) -> bool {
        self.current_session_start.is_some()
    }
}

// ─── Operation Results ────────────────────────────────────────────

/// Acknowledgement returned by `connect` / `disconnect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalAck {
    #[serde(rename = "isOnline")]
    pub is_online: bool,
    #[serde(rename = "lastActivity")]
    pub last_activity: DateTime<Utc>,
}

/// Read-only status of one session, as returned by `get_status`.
///
/// A tagged struct with a required discriminant — callers can never
/// observe a partially-shaped payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceStatus {
    #[serde(rename = "isOnline")]
    pub is_online: bool,
    /// Live elapsed time of the current interval. Present iff ONLINE.
    #[serde(rename = "currentSessionDurationMs", skip_serializing_if = "Option::is_none")]
    pub current_session_duration_ms: Option<u64>,
    #[serde(rename = "totalConnectionDurationMs")]
    pub total_connection_duration_ms: u64,
    #[serde(rename = "lastLoginAt")]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// One child's entry in the parent-facing aggregate view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildStatus {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub name: String,
    #[serde(rename = "isOnline")]
    pub is_online: bool,
    #[serde(rename = "currentSessionDurationMs", skip_serializing_if = "Option::is_none")]
    pub current_session_duration_ms: Option<u64>,
    #[serde(rename = "totalConnectionDurationMs")]
    pub total_connection_duration_ms: u64,
    #[serde(rename = "lastLoginAt")]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Summary returned by an orphan sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReapSummary {
    #[serde(rename = "closedCount")]
    pub closed_count: usize,
}

// ─── Error ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KintrackError {
    #[error("unknown session: {0}")]
    UnknownSession(String),
    #[error("session already registered: {0}")]
    DuplicateSession(String),
    #[error("invalid session role: {0}")]
    InvalidRole(String),
}

// ─── Tests ────────────────────────────────────────────────────────
