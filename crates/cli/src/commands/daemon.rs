// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ci daemon` - Daemon management commands

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use std::process::Command;

use crate::client::{find_daemon_binary, DaemonClient};
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon (foreground or background)
    Start {
        /// Run in foreground (useful for debugging)
        #[arg(long)]
        foreground: bool,
    },
    /// Save state and stop the daemon
    Stop,
    /// Check daemon status
    Status,
}

pub async fn daemon(args: DaemonArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        DaemonCommand::Start { foreground } => start(foreground, format).await,
        DaemonCommand::Stop => stop(format).await,
        DaemonCommand::Status => status(format).await,
    }
}

async fn start(foreground: bool, format: OutputFormat) -> Result<()> {
    if foreground {
        let cid = find_daemon_binary();
        let exit = Command::new(&cid)
            .status()
            .map_err(|e| anyhow!("cannot run {}: {}", cid.display(), e))?;
        if !exit.success() {
            return Err(anyhow!("cid exited with {}", exit));
        }
        return Ok(());
    }

    let running = match DaemonClient::connect() {
        Ok(client) => client.status().await.ok(),
        Err(_) => None,
    };
    if let Some(status) = running {
        let uptime = format_uptime(status.uptime_secs);
        let obj = serde_json::json!({ "status": "already_running", "uptime_secs": status.uptime_secs });
        return format_or_json(format, &obj, || println!("Daemon already running (uptime: {uptime})"));
    }

    DaemonClient::connect_or_start().await.map_err(|e| anyhow!("{}", e))?;
    let obj = serde_json::json!({ "status": "started" });
    format_or_json(format, &obj, || println!("Daemon started"))
}

async fn stop(format: OutputFormat) -> Result<()> {
    let stopped = DaemonClient::stop().await.map_err(|e| anyhow!("Failed to stop daemon: {}", e))?;
    if !stopped {
        return print_not_running(format);
    }
    let obj = serde_json::json!({ "status": "stopped" });
    format_or_json(format, &obj, || println!("Daemon stopped"))
}

async fn status(format: OutputFormat) -> Result<()> {
    let Ok(client) = DaemonClient::connect() else {
        return print_not_running(format);
    };

    // Socket file may outlive a crashed daemon
    let status = match client.status().await {
        Ok(status) => status,
        Err(e) if e.is_not_running() => return print_not_running(format),
        Err(e) => return Err(anyhow!("{}", e)),
    };
    let version = client.hello().await.unwrap_or_else(|_| "unknown".to_string());

    let obj = serde_json::json!({
        "status": "running",
        "version": version,
        "uptime_secs": status.uptime_secs,
        "uptime": format_uptime(status.uptime_secs),
        "jobs": status.jobs,
        "heartbeats": status.heartbeats,
        "socket": client.socket_path().display().to_string(),
    });
    format_or_json(format, &obj, || {
        let uptime = format_uptime(status.uptime_secs);
        for (label, value) in [
            ("Status", "running".to_string()),
            ("Version", version.clone()),
            ("Uptime", uptime),
            ("Jobs", status.jobs.to_string()),
            ("Heartbeats", status.heartbeats.to_string()),
        ] {
            println!("{label}: {value}");
        }
    })
}

fn print_not_running(format: OutputFormat) -> Result<()> {
    let obj = serde_json::json!({ "status": "not_running" });
    format_or_json(format, &obj, || println!("Daemon not running"))
}

/// `1h 2m 5s`, dropping leading zero units.
fn format_uptime(total: u64) -> String {
    let (h, m, s) = (total / 3600, total / 60 % 60, total % 60);
    match (h, m) {
        (0, 0) => format!("{s}s"),
        (0, _) => format!("{m}m {s}s"),
        _ => format!("{h}h {m}m {s}s"),
    }
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
