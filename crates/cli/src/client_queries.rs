// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query and command methods for DaemonClient.

use ci_core::JobRecord;
use ci_wire::{Request, Response, PROTOCOL_VERSION};
use serde::Serialize;

use crate::client::{ClientError, DaemonClient};

/// Daemon status as reported by `Request::Status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaemonStatus {
    pub uptime_secs: u64,
    pub jobs: usize,
    pub heartbeats: u64,
}

impl DaemonClient {
    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Self::reject(other),
        }
    }

    /// Get daemon version via Hello handshake
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello { version: PROTOCOL_VERSION.to_string() };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    pub async fn status(&self) -> Result<DaemonStatus, ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status { uptime_secs, jobs, heartbeats } => {
                Ok(DaemonStatus { uptime_secs, jobs, heartbeats })
            }
            other => Self::reject(other),
        }
    }

    pub async fn heartbeat(&self) -> Result<(), ClientError> {
        match self.send(&Request::HeartBeat).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn add_job(&self, name: &str, remote: &str, branch: &str) -> Result<(), ClientError> {
        let request = Request::AddJob {
            name: name.to_string(),
            remote: remote.to_string(),
            branch: branch.to_string(),
        };
        match self.send(&request).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn remove_job(&self, name: &str) -> Result<(), ClientError> {
        match self.send(&Request::RemoveJob { name: name.to_string() }).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    /// Every job, sorted by name, without captured output.
    pub async fn list_jobs(&self) -> Result<Vec<JobRecord>, ClientError> {
        let request = Request::ListJobs { refresh_output: false, build_output: false };
        match self.send(&request).await? {
            Response::Jobs { jobs } => Ok(jobs),
            other => Self::reject(other),
        }
    }

    pub async fn job_details(&self, name: &str) -> Result<JobRecord, ClientError> {
        match self.send(&Request::JobDetails { name: name.to_string() }).await? {
            Response::Job { job } => Ok(*job),
            other => Self::reject(other),
        }
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            other => Self::reject(other),
        }
    }
}
