//! Daemon loop: owns the shared state and drives the periodic orphan
//! sweep while the UDS server answers requests.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use kintrack_server::reaper;
use kintrack_server::service::PresenceService;
use kintrack_server::store::MemoryStore;

use crate::cli::DaemonOpts;
use crate::server;

/// Shared daemon state. One lock serializes presence transitions; the
/// store's conditional close keeps sweeps idempotent regardless.
pub struct DaemonState {
    pub service: PresenceService<MemoryStore>,
    pub max_session_age_ms: u64,
}

pub async fn run_daemon(opts: DaemonOpts, socket_path: &str) -> anyhow::Result<()> {
    let max_session_age_ms = opts.max_session_age_mins * 60_000;
    let state = Arc::new(Mutex::new(DaemonState {
        service: PresenceService::new(MemoryStore::new()),
        max_session_age_ms,
    }));

    let server_state = Arc::clone(&state);
    let server_socket = socket_path.to_string();
    let server_task = tokio::spawn(async move {
        server::run_server(&server_socket, server_state).await
    });

    let sweep_state = Arc::clone(&state);
    let sweep_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(
            opts.reap_interval_secs.max(1),
        ));
        // First tick fires immediately; skip it so a restart does not
        // sweep before clients had a chance to reconnect.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let mut st = sweep_state.lock().await;
            let max_age_ms = st.max_session_age_ms;
            if let Err(e) = reaper::reap_orphans(st.service.store_mut(), max_age_ms, Utc::now()) {
                tracing::warn!("orphan sweep failed: {e}");
            }
        }
    });

    let result = tokio::select! {
        r = server_task => match r {
            Ok(inner) => inner,
            Err(e) => Err(anyhow::anyhow!("server task panicked: {e}")),
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            Ok(())
        }
    };

    sweep_task.abort();
    let _ = std::fs::remove_file(socket_path);
    result
}
