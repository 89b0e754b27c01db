// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.
//!
//! Resolution mirrors the daemon so both sides agree on the socket path.

use std::path::PathBuf;
use std::time::Duration;

use crate::client::ClientError;

/// Resolve state directory: CI_STATE_DIR > XDG_STATE_HOME/ci > ~/.local/state/ci
pub fn state_dir() -> Result<PathBuf, ClientError> {
    if let Ok(dir) = std::env::var("CI_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("ci"));
    }
    let home = std::env::var("HOME").map_err(|_| ClientError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/ci"))
}

pub fn socket_path() -> Result<PathBuf, ClientError> {
    Ok(state_dir()?.join("daemon.sock"))
}

/// Per-request IPC timeout
pub fn ipc_timeout() -> Duration {
    duration_ms("CI_IPC_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// How long to wait for a spawned daemon to report ready, or a stopping one
/// to release its socket.
pub fn daemon_wait_timeout() -> Duration {
    duration_ms("CI_DAEMON_WAIT_MS").unwrap_or(Duration::from_secs(10))
}

/// Explicit path to the `cid` binary.
pub fn daemon_binary() -> Option<PathBuf> {
    std::env::var("CI_DAEMON_BINARY").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

fn duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
