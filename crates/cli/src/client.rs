// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client for the daemon's Unix socket.
//!
//! Every request opens a fresh connection; the daemon answers once and
//! closes it.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use ci_wire::{ProtocolError, Request, Response};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::UnixStream;

use crate::env;

/// Line the daemon prints on stdout once its sockets are bound.
const READY_LINE: &str = "READY";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running")]
    DaemonNotRunning,

    #[error("could not determine state directory (set CI_STATE_DIR or HOME)")]
    NoStateDir,

    #[error("failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("timed out waiting for daemon")]
    DaemonTimeout,

    #[error("{0}")]
    Rejected(String),

    #[error("unexpected response from daemon: {0}")]
    UnexpectedResponse(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl ClientError {
    /// True when the failure means nothing is listening on the socket.
    pub fn is_not_running(&self) -> bool {
        match self {
            ClientError::DaemonNotRunning => true,
            ClientError::Io(e) => {
                matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused)
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    /// Connect to a running daemon. Fails fast when the socket is absent.
    pub fn connect() -> Result<Self, ClientError> {
        let socket_path = env::socket_path()?;
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning);
        }
        Ok(Self::at(socket_path))
    }

    pub fn at(socket_path: impl Into<PathBuf>) -> Self {
        Self { socket_path: socket_path.into(), timeout: env::ipc_timeout() }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Connect to the daemon, spawning `cid` in the background if it is not
    /// answering.
    pub async fn connect_or_start() -> Result<Self, ClientError> {
        if let Ok(client) = Self::connect() {
            match client.ping().await {
                Ok(()) => return Ok(client),
                Err(e) if e.is_not_running() => {}
                Err(e) => return Err(e),
            }
        }
        start_background().await?;
        Self::connect()
    }

    pub(crate) async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path).await.map_err(|e| {
            match e.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused => {
                    ClientError::DaemonNotRunning
                }
                _ => ClientError::Io(e),
            }
        })?;
        let (mut reader, mut writer) = stream.into_split();
        ci_wire::write_request(&mut writer, request, self.timeout).await?;
        Ok(ci_wire::read_response(&mut reader, self.timeout).await?)
    }

    /// Turn a response of the wrong shape into an error.
    pub(crate) fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { message } => Err(ClientError::Rejected(message)),
            other => Err(ClientError::UnexpectedResponse(format!("{:?}", other))),
        }
    }

    /// Ask the daemon to shut down and wait for it to release the socket.
    ///
    /// Returns `false` when no daemon was running.
    pub async fn stop() -> Result<bool, ClientError> {
        let client = match Self::connect() {
            Ok(client) => client,
            Err(e) if e.is_not_running() => return Ok(false),
            Err(e) => return Err(e),
        };
        match client.shutdown().await {
            Ok(()) => {}
            Err(e) if e.is_not_running() => return Ok(false),
            Err(e) => return Err(e),
        }
        client.wait_for_exit(env::daemon_wait_timeout()).await?;
        Ok(true)
    }

    /// Poll until the socket file is removed.
    pub(crate) async fn wait_for_exit(&self, limit: Duration) -> Result<(), ClientError> {
        let poll = async {
            while self.socket_path.exists() {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };
        tokio::time::timeout(limit, poll).await.map_err(|_| ClientError::DaemonTimeout)
    }
}

/// Spawn `cid` detached and wait for it to print its ready line.
///
/// If the daemon exits first, whatever it wrote to stderr becomes the error.
async fn start_background() -> Result<(), ClientError> {
    let cid = find_daemon_binary();
    let mut child = tokio::process::Command::new(&cid)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(format!("{}: {}", cid.display(), e)))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ClientError::DaemonStartFailed("daemon stdout unavailable".into()))?;
    let mut lines = BufReader::new(stdout).lines();

    match tokio::time::timeout(env::daemon_wait_timeout(), lines.next_line()).await {
        Ok(Ok(Some(line))) if line.trim() == READY_LINE => Ok(()),
        Ok(_) => {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr).await;
            }
            Err(ClientError::DaemonStartFailed(startup_error(&stderr)))
        }
        Err(_) => Err(ClientError::DaemonTimeout),
    }
}

/// Last non-empty stderr line, without the binary's prefix.
pub(crate) fn startup_error(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(|l| l.strip_prefix("cid: ").unwrap_or(l).to_string())
        .unwrap_or_else(|| "daemon exited before becoming ready".to_string())
}

/// Locate `cid`: explicit override, then next to this binary, then PATH.
pub(crate) fn find_daemon_binary() -> PathBuf {
    if let Some(path) = env::daemon_binary() {
        return path;
    }
    if let Some(dir) = std::env::current_exe().ok().as_deref().and_then(Path::parent) {
        let sibling = dir.join("cid");
        if sibling.exists() {
            return sibling;
        }
    }
    PathBuf::from("cid")
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
