// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

/// Request from CLI to daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake
    Hello { version: String },

    /// Signal that new commits may be available for every job
    HeartBeat,

    /// Start tracking a project
    AddJob { name: String, remote: String, branch: String },

    /// Stop tracking a project and delete its workspace
    RemoveJob { name: String },

    /// Snapshot every job, optionally with captured output
    ListJobs {
        #[serde(default)]
        refresh_output: bool,
        #[serde(default)]
        build_output: bool,
    },

    /// Full snapshot of one job, including output
    JobDetails { name: String },

    /// Get daemon status
    Status,

    /// Persist state and stop the daemon
    Shutdown,
}
