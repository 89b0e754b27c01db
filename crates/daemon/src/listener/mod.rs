// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! Each connection carries one request and one response. Handlers only touch
//! the registry; job runs happen on their own tasks.

use std::sync::Arc;
use std::time::Instant;

use ci_adapters::{BuildRunner, SourceWorkspace};
use ci_core::Clock;
use ci_wire::{self as protocol, Request, Response, PROTOCOL_VERSION};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::engine::Registry;
use crate::env::ipc_timeout;

/// Shared daemon context for all request handlers.
pub(crate) struct ListenCtx<W, B, C> {
    pub registry: Arc<Registry<W, B, C>>,
    pub start_time: Instant,
    pub shutdown: Arc<Notify>,
}

/// Listener task for accepting socket connections.
pub(crate) struct Listener<W, B, C> {
    unix: UnixListener,
    ctx: Arc<ListenCtx<W, B, C>>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub(crate) enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),
}

impl<W, B, C> Listener<W, B, C>
where
    W: SourceWorkspace,
    B: BuildRunner,
    C: Clock,
{
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx<W, B, C>>) -> Self {
        Self { unix, ctx }
    }

    /// Accept connections forever, one task per connection.
    pub async fn run(self) {
        loop {
            match self.unix.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        let (reader, writer) = stream.into_split();
                        if let Err(e) = handle_connection(reader, writer, &ctx).await {
                            log_connection_error(e);
                        }
                    });
                }
                Err(e) => error!("unix accept error: {}", e),
            }
        }
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(protocol::ProtocolError::ConnectionClosed) => {
            debug!("client disconnected")
        }
        ConnectionError::Protocol(protocol::ProtocolError::Timeout) => {
            warn!("connection timeout")
        }
        _ => error!("connection error: {}", e),
    }
}

/// Handle a single client connection.
async fn handle_connection<R, Wr, W, B, C>(
    mut reader: R,
    mut writer: Wr,
    ctx: &ListenCtx<W, B, C>,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin,
    Wr: AsyncWrite + Unpin,
    W: SourceWorkspace,
    B: BuildRunner,
    C: Clock,
{
    let request = protocol::read_request(&mut reader, ipc_timeout()).await?;

    // Polling requests are frequent; log them quietly.
    if matches!(request, Request::Ping | Request::ListJobs { .. } | Request::JobDetails { .. } | Request::Status) {
        debug!(request = ?request, "received query");
    } else {
        info!(request = ?request, "received request");
    }

    let response = handle_request(request, ctx).await;
    debug!("sending response: {:?}", response);
    protocol::write_response(&mut writer, &response, ipc_timeout()).await?;
    Ok(())
}

/// Handle a single request and return a response.
///
/// Registry errors become `Response::Error` with the error's message.
async fn handle_request<W, B, C>(request: Request, ctx: &ListenCtx<W, B, C>) -> Response
where
    W: SourceWorkspace,
    B: BuildRunner,
    C: Clock,
{
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                warn!(client = %version, daemon = PROTOCOL_VERSION, "client version differs");
            }
            Response::Hello { version: PROTOCOL_VERSION.to_string() }
        }

        Request::HeartBeat => {
            ctx.registry.heartbeat();
            Response::Ok
        }

        Request::AddJob { name, remote, branch } => {
            match ctx.registry.add_job(&name, &remote, &branch) {
                Ok(()) => Response::Ok,
                Err(e) => Response::error(e.to_string()),
            }
        }

        Request::RemoveJob { name } => remove_job(&name, ctx).await,

        Request::ListJobs { refresh_output, build_output } => {
            Response::Jobs { jobs: ctx.registry.list_jobs(refresh_output, build_output) }
        }

        Request::JobDetails { name } => match ctx.registry.job_details(&name) {
            Ok(job) => Response::Job { job: Box::new(job) },
            Err(e) => Response::error(e.to_string()),
        },

        Request::Status => Response::Status {
            uptime_secs: ctx.start_time.elapsed().as_secs(),
            jobs: ctx.registry.len(),
            heartbeats: ctx.registry.heartbeats(),
        },

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

/// Unregister at once, then delete the workspace on its own task. The reply
/// waits for the deletion only up to half the IPC timeout, so a removal
/// stuck behind a long build still answers in time.
async fn remove_job<W, B, C>(name: &str, ctx: &ListenCtx<W, B, C>) -> Response
where
    W: SourceWorkspace,
    B: BuildRunner,
    C: Clock,
{
    let Some(job) = ctx.registry.unregister(name) else {
        return Response::Ok;
    };
    let registry = Arc::clone(&ctx.registry);
    let cleanup = tokio::spawn(async move { registry.delete_workspace(job).await });

    match tokio::time::timeout(ipc_timeout() / 2, cleanup).await {
        Ok(Ok(Ok(()))) => Response::Ok,
        Ok(Ok(Err(e))) => Response::error(e.to_string()),
        Ok(Err(e)) => Response::error(format!("removing {name}: {e}")),
        Err(_) => {
            info!(job = name, "workspace deletion continues after the in-flight run");
            Response::Ok
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
