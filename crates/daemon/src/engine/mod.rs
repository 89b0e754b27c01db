// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job execution engine: debounce, refresh, build and the job registry.

mod build;
mod debounce;
mod job;
mod refresh;
mod registry;

pub use registry::{Registry, RegistryError};

use std::path::PathBuf;
use std::time::Duration;

use ci_adapters::{CommandBuildRunner, GitWorkspace};
use ci_core::SystemClock;

/// Default quiet period between the last trigger and a run.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(10);

/// Registry with the production adapters.
pub type DaemonRegistry = Registry<GitWorkspace, CommandBuildRunner, SystemClock>;

/// Adapters a job runs against.
#[derive(Clone)]
pub struct EngineDeps<W, B, C> {
    pub workspace: W,
    pub builder: B,
    pub clock: C,
}

/// Engine settings shared by every job.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root of the job workspaces; a job lives in `workspaces_dir/<name>`.
    pub workspaces_dir: PathBuf,
    pub debounce: Duration,
}

impl EngineConfig {
    pub fn new(workspaces_dir: impl Into<PathBuf>) -> Self {
        Self { workspaces_dir: workspaces_dir.into(), debounce: DEFAULT_DEBOUNCE }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

#[cfg(test)]
pub(crate) mod test_helpers;
