// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution records: the persisted state of one refresh or build run.

use crate::version::Version;
use serde::{Deserialize, Serialize};

/// Which half of a job's run sequence a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Refresh,
    Build,
}

crate::simple_display! {
    Phase {
        Refresh => "refresh",
        Build => "build",
    }
}

/// Lifecycle of a single record.
///
/// Running is stored explicitly; the timestamps are timing data only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Never run
    #[default]
    Idle,
    /// A run is in progress
    Running,
    /// The last run has completed (successfully or not)
    Done,
}

crate::simple_display! {
    RunState {
        Idle => "idle",
        Running => "running",
        Done => "done",
    }
}

/// Error code recorded for any failed run.
pub const FAILED_ERRCODE: i32 = -1;

/// State of one completed-or-in-progress run of a phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    #[serde(default)]
    pub started_at_ms: u64,
    #[serde(default)]
    pub finished_at_ms: u64,
    #[serde(default)]
    pub state: RunState,
    /// 0 = success, nonzero = failure
    #[serde(default)]
    pub errcode: i32,
    /// Captured output
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub version: Version,
}

impl ExecutionRecord {
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn is_done(&self) -> bool {
        self.state == RunState::Done
    }

    pub fn has_run(&self) -> bool {
        self.state != RunState::Idle
    }

    pub fn failed(&self) -> bool {
        self.errcode != 0
    }

    /// Mark the record as running. Clears the previous outcome and output;
    /// the version is left alone.
    pub fn begin(&mut self, now_ms: u64) {
        self.started_at_ms = now_ms;
        self.finished_at_ms = 0;
        self.state = RunState::Running;
        self.errcode = 0;
        self.result.clear();
    }

    /// Mark the record as done with the given outcome.
    pub fn finish(&mut self, now_ms: u64, errcode: i32, result: String) {
        self.finished_at_ms = now_ms;
        self.state = RunState::Done;
        self.errcode = errcode;
        self.result = result;
    }

    /// Close out a run that was in progress when the daemon stopped.
    ///
    /// Returns false if the record was not running.
    pub fn interrupt(&mut self, now_ms: u64) -> bool {
        if !self.is_running() {
            return false;
        }
        self.finished_at_ms = now_ms;
        self.state = RunState::Done;
        self.errcode = FAILED_ERRCODE;
        if !self.result.is_empty() && !self.result.ends_with('\n') {
            self.result.push('\n');
        }
        self.result.push_str("interrupted by daemon restart\n");
        true
    }

    /// Wall time of the last completed run.
    pub fn duration_ms(&self) -> Option<u64> {
        match self.state {
            RunState::Done => Some(self.finished_at_ms.saturating_sub(self.started_at_ms)),
            _ => None,
        }
    }

    /// Milliseconds since the record last changed: since start while
    /// running, since end once done.
    pub fn since_ms(&self, now_ms: u64) -> u64 {
        match self.state {
            RunState::Running => now_ms.saturating_sub(self.started_at_ms),
            RunState::Done => now_ms.saturating_sub(self.finished_at_ms),
            RunState::Idle => 0,
        }
    }

    /// Copy without captured output.
    pub fn without_output(&self) -> Self {
        Self { result: String::new(), ..self.clone() }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
