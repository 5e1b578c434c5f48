//! UDS JSON-RPC server: minimal hand-rolled implementation.
//! Connection-per-request, newline-delimited JSON.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::sync::Mutex;

use kintrack_core::types::{KintrackError, SessionRecord, SessionRole};
use kintrack_server::{aggregator, reaper};

use crate::daemon::DaemonState;

/// Run the UDS JSON-RPC server.
pub async fn run_server(socket_path: &str, state: Arc<Mutex<DaemonState>>) -> anyhow::Result<()> {
    // Create socket directory with mode 0700
    let socket_dir = std::path::Path::new(socket_path)
        .parent()
        .ok_or_else(|| anyhow::anyhow!("invalid socket path"))?;

    std::fs::create_dir_all(socket_dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(socket_dir, std::fs::Permissions::from_mode(0o700))?;
    }

    // Check for stale socket
    if std::path::Path::new(socket_path).exists() {
        if tokio::net::UnixStream::connect(socket_path).await.is_err() {
            std::fs::remove_file(socket_path)?;
            tracing::info!("removed stale socket at {socket_path}");
        } else {
            anyhow::bail!("another daemon is already running at {socket_path}");
        }
    }

    let listener = UnixListener::bind(socket_path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
    }

    tracing::info!("UDS server listening on {socket_path}");

    loop {
        let (stream, _) = listener.accept().await?;
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, state).await {
                tracing::debug!("connection error: {e}");
            }
        });
    }
}

async fn handle_connection(
    stream: tokio::net::UnixStream,
    state: Arc<Mutex<DaemonState>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    let request: serde_json::Value = serde_json::from_str(line.trim())?;
    let method = request["method"].as_str().unwrap_or("");
    let params = request["params"].clone();
    let id = request["id"].clone();

    let outcome = {
        let mut st = state.lock().await;
        dispatch(&mut st, method, &params, Utc::now())
    };

    let response = match outcome {
        Ok(result) => serde_json::json!({
            "jsonrpc": "2.0",
            "result": result,
            "id": id,
        }),
        Err(e) => serde_json::json!({
            "jsonrpc": "2.0",
            "error": {"code": e.code, "message": e.message},
            "id": id,
        }),
    };
    let mut resp = serde_json::to_string(&response)?;
    resp.push('\n');
    writer.write_all(resp.as_bytes()).await?;

    Ok(())
}

// ─── Dispatch ─────────────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
        }
    }
}

impl From<KintrackError> for RpcError {
    fn from(e: KintrackError) -> Self {
        Self {
            code: -32000,
            message: e.to_string(),
        }
    }
}

fn param_str<'a>(params: &'a serde_json::Value, key: &str) -> Result<&'a str, RpcError> {
    params[key]
        .as_str()
        .ok_or_else(|| RpcError::invalid_params(&format!("missing param: {key}")))
}

fn to_result<T: serde::Serialize>(value: T) -> Result<serde_json::Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError {
        code: -32603,
        message: e.to_string(),
    })
}

/// Handle one request against the locked daemon state. Pure apart from
/// the store mutation, so tests drive it with a fixed `now`.
pub(crate) fn dispatch(
    state: &mut DaemonState,
    method: &str,
    params: &serde_json::Value,
    now: DateTime<Utc>,
) -> Result<serde_json::Value, RpcError> {
    match method {
        "register_session" => {
            let session_id = param_str(params, "sessionId")?;
            let account_id = param_str(params, "accountId")?;
            let name = param_str(params, "name")?;
            let role: SessionRole = params["role"]
                .as_str()
                .unwrap_or("child")
                .parse()
                .map_err(RpcError::from)?;

            let record = SessionRecord::new(session_id, account_id, name, role);
            match state.service.register(record) {
                Ok(()) => Ok(serde_json::json!({"registered": true})),
                // Re-registration is a retry, not a conflict.
                Err(KintrackError::DuplicateSession(_)) => {
                    Ok(serde_json::json!({"registered": false}))
                }
                Err(e) => Err(e.into()),
            }
        }
        "connect" => {
            let session_id = param_str(params, "sessionId")?;
            let ack = state.service.connect(session_id, now)?;
            to_result(ack)
        }
        "disconnect" => {
            let session_id = param_str(params, "sessionId")?;
            let ack = state.service.disconnect(session_id, now)?;
            to_result(ack)
        }
        "get_status" => {
            let session_id = param_str(params, "sessionId")?;
            let status = state.service.status(session_id, now)?;
            to_result(status)
        }
        "list_children_status" => {
            let account_id = param_str(params, "accountId")?;
            let statuses = aggregator::children_status(state.service.store(), account_id, now);
            to_result(statuses)
        }
        "family_narrative" => {
            let account_id = param_str(params, "accountId")?;
            let narrative = aggregator::family_narrative(state.service.store(), account_id, now);
            Ok(serde_json::json!({"narrative": narrative}))
        }
        "reap_orphans" => {
            let max_age_ms = params["maxAgeMs"].as_u64().unwrap_or(state.max_session_age_ms);
            let summary = reaper::reap_orphans(state.service.store_mut(), max_age_ms, now)?;
            to_result(summary)
        }
        _ => Err(RpcError {
            code: -32601,
            message: "method not found".to_string(),
        }),
    }
}

// ─── Tests ────────────────────────────────────────────────────────
