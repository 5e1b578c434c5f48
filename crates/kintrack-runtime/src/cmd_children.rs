//! `kintrack children <account>`: per-child presence table plus the
//! aggregate narrative.

use chrono::{DateTime, Utc};

use kintrack_core::display;
use kintrack_core::types::ChildStatus;

use crate::client;

pub async fn cmd_children(socket_path: &str, account: &str) -> anyhow::Result<()> {
    print!("{}", fetch_view(socket_path, account).await?);
    Ok(())
}

/// Fetch and render the full children view. Shared with `watch`.
pub(crate) async fn fetch_view(socket_path: &str, account: &str) -> anyhow::Result<String> {
    let params = serde_json::json!({"accountId": account});
    let children = client::rpc_call(socket_path, "list_children_status", params.clone()).await?;
    let children: Vec<ChildStatus> = serde_json::from_value(children)?;
    let narrative = client::rpc_call(socket_path, "family_narrative", params).await?;
    let narrative = narrative["narrative"].as_str().unwrap_or_default().to_string();
    Ok(render(&children, &narrative, Utc::now()))
}

pub(crate) fn render(children: &[ChildStatus], narrative: &str, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    for child in children {
        out.push_str(&format_child_line(child, now));
        out.push('\n');
    }
    if !children.is_empty() {
        out.push('\n');
    }
    out.push_str(narrative);
    out.push('\n');
    out
}

fn format_child_line(child: &ChildStatus, now: DateTime<Utc>) -> String {
    let total = display::format_duration_ms(child.total_connection_duration_ms);
    match child.current_session_duration_ms {
        Some(current) if child.is_online => format!(
            "● {} — online for {} (total {total})",
            child.name,
            display::format_duration_ms(current)
        ),
        _ => format!(
            "○ {} — {} (total {total})",
            child.name,
            display::last_seen_phrase(child.last_login_at, now)
        ),
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

    fn child(name: &str, online_mins: Option<u64>, last_login_ms: Option<i64>) -> ChildStatus {
        ChildStatus {
            session_id: format!("sess-{name}"),
            name: name.to_owned(),
            is_online: online_mins.is_some(),
            current_session_duration_ms: online_mins.map(|m| m * 60_000),
            total_connection_duration_ms: 3_600_000,
            last_login_at: last_login_ms.map(at),
        }
    }

    #[test]
    fn renders_online_and_offline_lines() {
        let now = at(10 * 86_400_000);
        let children = vec![
            child("Emma", Some(12), Some(0)),
            child("Noah", None, None),
        ];
        let out = render(&children, "1 child online.", now);
        assert_eq!(
            out,
            "● Emma — online for 12min (total 1h 0min)\n\
             ○ Noah — never connected (total 1h 0min)\n\
             \n\
             1 child online.\n"
        );
    }

    #[test]
    fn renders_narrative_only_when_empty() {
        let out = render(&[], "no children registered", at(0));
        assert_eq!(out, "no children registered\n");
    }
}
