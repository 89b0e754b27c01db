// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cid: the ci daemon.
//!
//! Loads the job snapshot, serves the Unix socket and the webhook listener,
//! and saves the snapshot once on SIGINT, SIGTERM or a `Shutdown` request.

mod engine;
mod env;
mod hook;
mod lifecycle;
mod listener;

use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::hook::HookListener;
use crate::lifecycle::{Config, LifecycleError};
use crate::listener::{ListenCtx, Listener};

fn main() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("cid: {e}");
            std::process::exit(1);
        }
    };

    // Guard must live until exit so buffered log lines are flushed.
    let _log_guard = match init_logging(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("cid: failed to open log {}: {e}", config.log_path.display());
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to start tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(config)) {
        error!("{}", e);
        eprintln!("cid: {e}");
        std::process::exit(1);
    }
}

fn init_logging(config: &Config) -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(&config.state_dir)?;
    let file = std::fs::OpenOptions::new().create(true).append(true).open(&config.log_path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

async fn run(config: Config) -> Result<(), LifecycleError> {
    let started = lifecycle::startup(&config).await?;
    let daemon = started.daemon;
    let shutdown = Arc::new(Notify::new());

    let ctx = Arc::new(ListenCtx {
        registry: Arc::clone(&daemon.registry),
        start_time: daemon.start_time,
        shutdown: Arc::clone(&shutdown),
    });
    tokio::spawn(Listener::new(started.listener, ctx).run());
    if let Some(tcp) = started.hook {
        let hook = HookListener::new(tcp, Arc::clone(&daemon.registry), env::ipc_timeout());
        tokio::spawn(hook.run());
    }

    // The CLI waits for this line after spawning the daemon.
    println!("READY");
    info!(socket = %config.socket_path.display(), "daemon ready");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
        _ = shutdown.notified() => info!("shutdown requested"),
    }

    daemon.shutdown()
}
