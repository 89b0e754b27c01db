// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reporting status derived from a job's two execution records.
//!
//! Nothing here is stored: status is always recomputed from the records so
//! it cannot drift from what was persisted.

use crate::record::ExecutionRecord;
use serde::{Deserialize, Serialize};

/// Overall status of a job, as shown in `ci list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pulling,
    Building,
    NeedBuild,
    PullFailed,
    BuildFailed,
    Success,
}

crate::simple_display! {
    JobStatus {
        Pulling => "Pulling",
        Building => "Building",
        NeedBuild => "Need Build",
        PullFailed => "Pulling Failed",
        BuildFailed => "Building Failed",
        Success => "Success",
    }
}

impl JobStatus {
    /// Derive the job status. First match wins: running phases, then a
    /// pending build, then failures.
    pub fn derive(refresh: &ExecutionRecord, build: &ExecutionRecord) -> Self {
        if refresh.is_running() {
            JobStatus::Pulling
        } else if build.is_running() {
            JobStatus::Building
        } else if refresh.version != build.version {
            JobStatus::NeedBuild
        } else if refresh.failed() {
            JobStatus::PullFailed
        } else if build.failed() {
            JobStatus::BuildFailed
        } else {
            JobStatus::Success
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobStatus::PullFailed | JobStatus::BuildFailed)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Pulling | JobStatus::Building)
    }
}

/// Status of a single phase record, as shown in `ci log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Never,
    Running,
    Failed,
    Success,
}

crate::simple_display! {
    PhaseStatus {
        Never => "never run",
        Running => "running",
        Failed => "failed",
        Success => "success",
    }
}

impl From<&ExecutionRecord> for PhaseStatus {
    fn from(rec: &ExecutionRecord) -> Self {
        if rec.is_running() {
            PhaseStatus::Running
        } else if !rec.has_run() {
            PhaseStatus::Never
        } else if rec.failed() {
            PhaseStatus::Failed
        } else {
            PhaseStatus::Success
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
