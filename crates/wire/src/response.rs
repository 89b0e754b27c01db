// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use ci_core::JobRecord;
use serde::{Deserialize, Serialize};

/// Daemon reply; exactly one per request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Response {
    /// Add, remove, heartbeat accepted
    Ok,

    Pong,

    /// Daemon crate version
    Hello { version: String },

    /// Snapshot is being written; the socket closes next
    ShuttingDown,

    /// Every tracked job, ordered by name
    Jobs { jobs: Vec<JobRecord> },

    Job { job: Box<JobRecord> },

    Status {
        uptime_secs: u64,
        jobs: usize,
        /// Heartbeats received since startup
        #[serde(default)]
        heartbeats: u64,
    },

    /// Request rejected; `message` is shown to the user verbatim
    Error { message: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error { message: message.into() }
    }
}
