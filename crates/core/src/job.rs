// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identity and the serializable job record.

use crate::record::ExecutionRecord;
use crate::status::JobStatus;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};
use thiserror::Error;

/// Identity of a tracked project.
///
/// The name doubles as the workspace directory, relative to the daemon's
/// workspaces root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobSpec {
    pub name: String,
    pub remote: String,
    pub branch: String,
}

impl JobSpec {
    pub fn new(name: impl Into<String>, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        Self { name: name.into(), remote: remote.into(), branch: branch.into() }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobNameError {
    #[error("job name is empty")]
    Empty,
    #[error("job name {0:?} must be a relative path without '.' or '..' components")]
    NotRelative(String),
}

/// Check that `name` is usable as a directory below the workspaces root.
pub fn validate_job_name(name: &str) -> Result<(), JobNameError> {
    if name.trim().is_empty() {
        return Err(JobNameError::Empty);
    }
    let all_normal = Path::new(name).components().all(|c| matches!(c, Component::Normal(_)));
    if !all_normal {
        return Err(JobNameError::NotRelative(name.to_string()));
    }
    Ok(())
}

/// Full state of one job: identity plus both execution records.
///
/// Used both for persistence and as the snapshot sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub name: String,
    pub remote: String,
    pub branch: String,
    #[serde(default)]
    pub refresh: ExecutionRecord,
    #[serde(default)]
    pub build: ExecutionRecord,
}

impl JobRecord {
    pub fn new(spec: JobSpec) -> Self {
        Self {
            name: spec.name,
            remote: spec.remote,
            branch: spec.branch,
            refresh: ExecutionRecord::default(),
            build: ExecutionRecord::default(),
        }
    }

    pub fn spec(&self) -> JobSpec {
        JobSpec::new(&self.name, &self.remote, &self.branch)
    }

    pub fn status(&self) -> JobStatus {
        JobStatus::derive(&self.refresh, &self.build)
    }

    /// Drop captured output from the phases not requested.
    pub fn with_output(mut self, refresh: bool, build: bool) -> Self {
        if !refresh {
            self.refresh.result.clear();
        }
        if !build {
            self.build.result.clear();
        }
        self
    }
}

/// Everything the daemon persists: every job, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetState {
    #[serde(default)]
    pub jobs: Vec<JobRecord>,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
