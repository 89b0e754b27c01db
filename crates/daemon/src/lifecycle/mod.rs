// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: configuration, startup, shutdown.

mod config;
mod persist;
mod startup;

pub use config::{parse_hook_addr, ConfigError, FileConfig, DEFAULT_HOOK_ADDR};
pub use persist::{persist, restore};
pub use startup::startup;

use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ci_adapters::DEFAULT_BUILD_COMMAND;
use thiserror::Error;
use tokio::net::{TcpListener, UnixListener};
use tracing::{info, warn};

use crate::engine::{DaemonRegistry, RegistryError, DEFAULT_DEBOUNCE};

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/ci)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to version file
    pub version_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the job snapshot
    pub snapshot_path: PathBuf,
    /// Root of the job workspaces
    pub workspaces_path: PathBuf,
    pub debounce: Duration,
    /// `None` when the webhook listener is off
    pub hook_addr: Option<SocketAddr>,
    pub build_command: Vec<String>,
}

impl Config {
    /// Load configuration for the user-level daemon.
    ///
    /// Paths live under the state directory. `config.toml` there may set
    /// the debounce period, hook address and build command; environment
    /// variables override it.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = crate::env::state_dir()?;
        let file = FileConfig::load(&state_dir.join("config.toml"))?;
        Self::resolve(state_dir, file, crate::env::debounce(), crate::env::hook_addr())
    }

    fn resolve(
        state_dir: PathBuf,
        file: FileConfig,
        env_debounce: Option<Duration>,
        env_hook_addr: Option<String>,
    ) -> Result<Self, LifecycleError> {
        let debounce = env_debounce
            .or(file.debounce_secs.map(Duration::from_secs))
            .unwrap_or(DEFAULT_DEBOUNCE);
        let hook_addr = env_hook_addr.or(file.hook_addr).unwrap_or_else(|| DEFAULT_HOOK_ADDR.to_string());
        let hook_addr = parse_hook_addr(&hook_addr)?;
        let build_command = match file.build_command {
            Some(argv) if argv.is_empty() => return Err(ConfigError::EmptyBuildCommand.into()),
            Some(argv) => argv,
            None => DEFAULT_BUILD_COMMAND.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            snapshot_path: state_dir.join("ci.db"),
            workspaces_path: state_dir.join("workspaces"),
            state_dir,
            debounce,
            hook_addr,
            build_command,
        })
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub registry: Arc<DaemonRegistry>,
    pub start_time: Instant,
}

/// Result of daemon startup: the state plus the listeners to spawn.
pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: UnixListener,
    /// Webhook listener, unless disabled
    pub hook: Option<TcpListener>,
}

impl DaemonState {
    /// Stop triggering jobs, save the snapshot and remove runtime files.
    ///
    /// A failed save is returned so the caller can exit nonzero; runtime
    /// files are removed either way.
    pub fn shutdown(&self) -> Result<(), LifecycleError> {
        info!("shutting down daemon");
        self.registry.shutdown();
        let saved = persist(&self.registry, &self.config.snapshot_path);

        for path in [&self.config.socket_path, &self.config.lock_path, &self.config.version_path] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "failed to remove runtime file");
                }
            }
        }

        saved?;
        info!("daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("failed to bind hook listener at {0}: {1}")]
    HookBindFailed(SocketAddr, std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] ci_storage::SnapshotError),

    #[error("invalid snapshot: {0}")]
    Registry(#[from] RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
