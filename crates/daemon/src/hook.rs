// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook ingress: every HTTP request is a heartbeat.
//!
//! The request itself is read and discarded; forges can point any push hook
//! at the daemon without configuration.

use std::sync::Arc;
use std::time::Duration;

use ci_adapters::{BuildRunner, SourceWorkspace};
use ci_core::Clock;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::engine::Registry;

/// Upper bound on bytes read from one request, headers and body together.
const MAX_REQUEST_BYTES: u64 = 1024 * 1024;

const RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 3\r\nConnection: close\r\n\r\nok\n";

pub(crate) struct HookListener<W, B, C> {
    tcp: TcpListener,
    registry: Arc<Registry<W, B, C>>,
    timeout: Duration,
}

impl<W, B, C> HookListener<W, B, C>
where
    W: SourceWorkspace,
    B: BuildRunner,
    C: Clock,
{
    pub fn new(tcp: TcpListener, registry: Arc<Registry<W, B, C>>, timeout: Duration) -> Self {
        Self { tcp, registry, timeout }
    }

    pub async fn run(self) {
        if let Ok(addr) = self.tcp.local_addr() {
            info!(%addr, "webhook listener ready");
        }
        loop {
            match self.tcp.accept().await {
                Ok((stream, peer)) => {
                    let registry = Arc::clone(&self.registry);
                    let timeout = self.timeout;
                    tokio::spawn(async move {
                        let (reader, writer) = stream.into_split();
                        match tokio::time::timeout(timeout, serve(reader, writer)).await {
                            Ok(Ok(request_line)) => {
                                info!(%peer, request = %request_line, "webhook heartbeat");
                                registry.heartbeat();
                            }
                            Ok(Err(e)) => debug!(%peer, error = %e, "webhook connection failed"),
                            Err(_) => debug!(%peer, "webhook connection timed out"),
                        }
                    });
                }
                Err(e) => error!("hook accept error: {}", e),
            }
        }
    }
}

/// Read one request, answer `200 OK`, and return the request line.
async fn serve<R, Wr>(reader: R, mut writer: Wr) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
    Wr: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader.take(MAX_REQUEST_BYTES));

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    if request_line.is_empty() {
        return Err(std::io::ErrorKind::UnexpectedEof.into());
    }

    let mut content_length: u64 = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await?;
        if line == "\r\n" || line == "\n" || line.is_empty() {
            break;
        }
        let line_lower = line.to_ascii_lowercase();
        if let Some(val) = line_lower.strip_prefix("content-length:") {
            content_length = val.trim().parse().unwrap_or(0);
        }
    }
    if content_length > 0 {
        tokio::io::copy(&mut (&mut reader).take(content_length), &mut tokio::io::sink()).await?;
    }

    writer.write_all(RESPONSE).await?;
    writer.flush().await?;
    Ok(request_line.trim_end().to_string())
}

#[cfg(test)]
#[path = "hook_tests.rs"]
mod tests;
