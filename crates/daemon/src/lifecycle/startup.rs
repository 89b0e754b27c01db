// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bringing the daemon up: lock, restore, bind.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use ci_adapters::{CommandBuildRunner, GitWorkspace};
use ci_core::SystemClock;
use fs2::FileExt;
use tokio::net::{TcpListener, UnixListener};
use tracing::info;

use super::{restore, Config, DaemonState, LifecycleError, StartupResult};
use crate::engine::{EngineConfig, EngineDeps, Registry};

/// Take the lock, restore jobs, then bind. On failure, remove whatever was
/// created unless another daemon holds the lock.
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    let result = bring_up(config).await;
    if let Err(e) = &result {
        if !matches!(e, LifecycleError::LockFailed(_)) {
            remove_runtime_files(config);
        }
    }
    result
}

/// Exclusive lock on `daemon.pid`, rewritten with our PID once held.
fn acquire_lock(config: &Config) -> Result<File, LifecycleError> {
    // No truncate on open: a failed attempt must leave the holder's PID.
    let mut file =
        OpenOptions::new().write(true).create(true).truncate(false).open(&config.lock_path)?;
    file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}

async fn bring_up(config: &Config) -> Result<StartupResult, LifecycleError> {
    fs::create_dir_all(&config.state_dir)?;
    let lock_file = acquire_lock(config)?;

    fs::create_dir_all(&config.workspaces_path)?;
    fs::write(&config.version_path, ci_wire::PROTOCOL_VERSION)?;

    let deps = EngineDeps {
        workspace: GitWorkspace,
        builder: CommandBuildRunner::new(config.build_command.clone()),
        clock: SystemClock,
    };
    let engine = EngineConfig::new(&config.workspaces_path).with_debounce(config.debounce);
    let registry = Arc::new(Registry::new(deps, engine));

    // Jobs must be loaded before any trigger can arrive.
    let restored = restore(&registry, &config.snapshot_path)?;

    let hook = match config.hook_addr {
        Some(addr) => Some(
            TcpListener::bind(addr).await.map_err(|e| LifecycleError::HookBindFailed(addr, e))?,
        ),
        None => None,
    };

    // Stale socket from a crashed daemon; the lock proves nobody serves it.
    match fs::remove_file(&config.socket_path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
        _ => {}
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!(
        jobs = restored.jobs,
        interrupted = restored.interrupted,
        debounce_ms = config.debounce.as_millis() as u64,
        hook = ?config.hook_addr,
        "daemon started"
    );

    Ok(StartupResult {
        daemon: DaemonState { config: config.clone(), lock_file, registry, start_time: Instant::now() },
        listener,
        hook,
    })
}

fn remove_runtime_files(config: &Config) {
    for path in [&config.socket_path, &config.version_path, &config.lock_path] {
        let _ = fs::remove_file(path);
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
