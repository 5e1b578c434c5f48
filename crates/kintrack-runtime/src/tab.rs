//! `kintrack tab <session>`: drives one tab controller against the
//! daemon. Stdin commands stand in for browser events: `active`,
//! `hide`, `show`, `quit`.

use std::time::Duration;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};

use kintrack_client::activity::InactivityTracker;
use kintrack_client::broadcast::InProcessHub;
use kintrack_client::status_client::{StatusClient, StatusIntent};
use kintrack_client::tab::{TabController, TabEvent};

use crate::client;

pub async fn run_tab(
    socket_path: &str,
    session: &str,
    timeout_mins: u64,
    tick_ms: u64,
) -> anyhow::Result<()> {
    // Reconciliation read: adopt server truth before signalling.
    let status = client::rpc_call(
        socket_path,
        "get_status",
        serde_json::json!({"sessionId": session}),
    )
    .await?;
    let server_online = status["isOnline"].as_bool().unwrap_or(false);

    let hub = InProcessHub::new();
    let now = Utc::now();
    let mut controller = TabController::new(
        InactivityTracker::new(timeout_mins * 60_000, now),
        hub.handle(),
        StatusClient::new(server_online),
    );

    // Opening the tab counts as becoming visible.
    let intents = controller.on_event(TabEvent::Visible, now);
    forward(socket_path, session, &intents).await;

    println!("tab {session} — commands: active, hide, show, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(tick_ms.max(50)));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(text) = line? else { break };
                match parse_command(&text) {
                    Some(TabCommand::Quit) => break,
                    Some(TabCommand::Event(event)) => {
                        let intents = controller.on_event(event, Utc::now());
                        forward(socket_path, session, &intents).await;
                    }
                    None => {
                        if !text.trim().is_empty() {
                            println!("commands: active, hide, show, quit");
                        }
                    }
                }
            }
            _ = ticker.tick() => {
                let was_out = controller.timed_out();
                let intents = controller.tick(Utc::now());
                forward(socket_path, session, &intents).await;
                if controller.timed_out() && !was_out {
                    println!("inactivity timeout — logged out");
                }
            }
        }
    }

    // Closing the tab always signals offline; the coalescing window
    // does not apply to a deliberate close.
    if let Err(e) = client::rpc_call(
        socket_path,
        "disconnect",
        serde_json::json!({"sessionId": session}),
    )
    .await
    {
        tracing::warn!("final disconnect failed: {e}");
    }
    Ok(())
}

/// Send each due intent to the daemon. Failures are logged and
/// dropped; the controller's state machine re-emits on reconnect.
async fn forward(socket_path: &str, session: &str, intents: &[StatusIntent]) {
    for intent in intents {
        let method = match intent {
            StatusIntent::Connect => "connect",
            StatusIntent::Disconnect => "disconnect",
        };
        let params = serde_json::json!({"sessionId": session});
        if let Err(e) = client::rpc_call(socket_path, method, params).await {
            tracing::warn!("{method} failed: {e}");
        }
    }
}

enum TabCommand {
    Event(TabEvent),
    Quit,
}

fn parse_command(line: &str) -> Option<TabCommand> {
    match line.trim() {
        "active" | "a" => Some(TabCommand::Event(TabEvent::Interaction)),
        "hide" | "h" => Some(TabCommand::Event(TabEvent::Hidden)),
        "show" | "s" => Some(TabCommand::Event(TabEvent::Visible)),
        "quit" | "q" => Some(TabCommand::Quit),
        _ => None,
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse() {
        assert!(matches!(
            parse_command("active"),
            Some(TabCommand::Event(TabEvent::Interaction))
        ));
        assert!(matches!(
            parse_command(" hide "),
            Some(TabCommand::Event(TabEvent::Hidden))
        ));
        assert!(matches!(
            parse_command("s"),
            Some(TabCommand::Event(TabEvent::Visible))
        ));
        assert!(matches!(parse_command("q"), Some(TabCommand::Quit)));
        assert!(parse_command("dance").is_none());
        assert!(parse_command("").is_none());
    }
}
