// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: CI_STATE_DIR > XDG_STATE_HOME/ci > ~/.local/state/ci
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("CI_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("ci"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/ci"))
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    duration_ms("CI_IPC_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// Debounce quiet period override
pub fn debounce() -> Option<Duration> {
    duration_ms("CI_DEBOUNCE_MS")
}

/// Webhook listen address override; `off` disables the listener.
pub fn hook_addr() -> Option<String> {
    std::env::var("CI_HOOK_ADDR").ok().filter(|s| !s.is_empty())
}

fn duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}
