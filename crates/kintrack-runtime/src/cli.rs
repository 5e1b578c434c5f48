//! CLI definition using clap derive.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kintrack", about = "family session presence and connection-time tracker")]
pub struct Cli {
    /// UDS socket path (default: /tmp/kintrack-$USER/kintrackd.sock)
    #[arg(long, short = 's', global = true)]
    pub socket_path: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the daemon (UDS server + periodic orphan sweeps)
    Daemon(DaemonOpts),
    /// Register a new session with the daemon
    Register(RegisterOpts),
    /// Show one session's presence status
    Status(StatusOpts),
    /// List child presence for an account
    Children(ChildrenOpts),
    /// Live-refresh child presence for an account
    Watch(WatchOpts),
    /// Run one orphan sweep immediately
    Reap(ReapOpts),
    /// Run an interactive tab session against the daemon
    Tab(TabOpts),
}

#[derive(clap::Args)]
pub struct DaemonOpts {
    /// Seconds between orphan sweeps
    #[arg(long, default_value = "60")]
    pub reap_interval_secs: u64,

    /// Minutes an ONLINE interval may age before a sweep closes it
    #[arg(long, default_value = "30")]
    pub max_session_age_mins: u64,
}

#[derive(clap::Args)]
pub struct RegisterOpts {
    /// Session id
    pub session: String,

    /// Owning account id
    #[arg(long)]
    pub account: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Session role: parent or child
    #[arg(long, default_value = "child")]
    pub role: String,
}

#[derive(clap::Args)]
pub struct StatusOpts {
    /// Session id
    pub session: String,
}

#[derive(clap::Args)]
pub struct ChildrenOpts {
    /// Account id
    pub account: String,
}

#[derive(clap::Args)]
pub struct WatchOpts {
    /// Account id
    pub account: String,

    /// Refresh interval in seconds
    #[arg(long, default_value = "10")]
    pub interval: u64,
}

#[derive(clap::Args)]
pub struct ReapOpts {
    /// Override the daemon's max session age for this sweep (minutes)
    #[arg(long)]
    pub max_age_mins: Option<u64>,
}

#[derive(clap::Args)]
pub struct TabOpts {
    /// Session id
    pub session: String,

    /// Inactivity timeout in minutes
    #[arg(long, default_value = "10")]
    pub timeout_mins: u64,

    /// Milliseconds between controller ticks
    #[arg(long, default_value = "250")]
    pub tick_ms: u64,
}

/// Default socket path using $USER for per-user isolation.
pub fn default_socket_path() -> String {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        return format!("{dir}/kintrack/kintrackd.sock");
    }
    let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    format!("/tmp/kintrack-{user}/kintrackd.sock")
}
