//! `kintrack status <session>`: one session's presence, formatted.

use chrono::{DateTime, Utc};

use kintrack_core::display;
use kintrack_core::types::PresenceStatus;

use crate::client;

pub async fn cmd_status(socket_path: &str, session: &str) -> anyhow::Result<()> {
    let params = serde_json::json!({"sessionId": session});
    let result = client::rpc_call(socket_path, "get_status", params).await?;
    let status: PresenceStatus = serde_json::from_value(result)?;
    println!("{}", format_status(&status, Utc::now()));
    Ok(())
}

/// Render one status line. Separated from the RPC so it can be tested.
pub(crate) fn format_status(status: &PresenceStatus, now: DateTime<Utc>) -> String {
    let total = display::format_duration_ms(status.total_connection_duration_ms);
    match status.current_session_duration_ms {
        Some(current) if status.is_online => format!(
            "online — connected for {} (total {total})",
            display::format_duration_ms(current)
        ),
        _ => format!(
            "offline — {} (total {total})",
            display::last_seen_phrase(status.last_login_at, now)
        ),
    }
}

// ─── Tests ────────────────────────────────────────────────────────
