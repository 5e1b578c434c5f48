//! `kintrack watch <account>`: polling refresh over the children view.
//!
//! Each poll fully replaces the display (last write wins); a failed
//! poll keeps the previous frame and retries on the next interval.

use std::time::Duration;

use tokio::signal;
use tokio::time::sleep;

use crate::cmd_children;

pub async fn cmd_watch(socket_path: &str, account: &str, interval_secs: u64) -> anyhow::Result<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    loop {
        match cmd_children::fetch_view(socket_path, account).await {
            Ok(view) => {
                // Clear screen and move cursor home
                print!("\x1b[2J\x1b[H");
                println!("kintrack watch — {account} (every {}s, Ctrl-C to quit)\n", interval.as_secs());
                print!("{view}");
            }
            Err(e) => {
                tracing::warn!("poll failed: {e}");
            }
        }

        tokio::select! {
            _ = sleep(interval) => {}
            _ = signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    Ok(())
}
