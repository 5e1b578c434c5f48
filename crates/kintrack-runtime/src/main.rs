//! kintrack: family session presence and connection-time daemon.
//! Single-process binary embedding the server, the reaper, and the
//! client-side tab runtime.

use clap::Parser;

mod cli;
mod client;
mod cmd_children;
mod cmd_status;
mod cmd_watch;
mod daemon;
mod server;
mod tab;

fn init_tracing(default_filter: &str) {
    let filter = std::env::var("KINTRACK_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_filter.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    let socket_path = args.socket_path.unwrap_or_else(cli::default_socket_path);

    match args.command {
        cli::Command::Daemon(opts) => {
            init_tracing("info");
            tracing::info!("kintrack daemon starting");
            daemon::run_daemon(opts, &socket_path).await?;
        }
        cli::Command::Register(opts) => {
            init_tracing("warn");
            let params = serde_json::json!({
                "sessionId": opts.session,
                "accountId": opts.account,
                "name": opts.name,
                "role": opts.role,
            });
            let result = client::rpc_call(&socket_path, "register_session", params).await?;
            if result["registered"] == true {
                println!("registered {}", opts.session);
            } else {
                println!("{} was already registered", opts.session);
            }
        }
        cli::Command::Status(opts) => {
            init_tracing("warn");
            cmd_status::cmd_status(&socket_path, &opts.session).await?;
        }
        cli::Command::Children(opts) => {
            init_tracing("warn");
            cmd_children::cmd_children(&socket_path, &opts.account).await?;
        }
        cli::Command::Watch(opts) => {
            init_tracing("warn");
            cmd_watch::cmd_watch(&socket_path, &opts.account, opts.interval).await?;
        }
        cli::Command::Reap(opts) => {
            init_tracing("warn");
            let params = match opts.max_age_mins {
                Some(mins) => serde_json::json!({"maxAgeMs": mins * 60_000}),
                None => serde_json::json!({}),
            };
            let summary = client::rpc_call(&socket_path, "reap_orphans", params).await?;
            println!("closed {} orphaned session(s)", summary["closedCount"]);
        }
        cli::Command::Tab(opts) => {
            init_tracing("warn");
            tab::run_tab(&socket_path, &opts.session, opts.timeout_mins, opts.tick_ms).await?;
        }
    }

    Ok(())
}
