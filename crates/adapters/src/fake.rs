// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted adapters for engine tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::build::BuildRunner;
use crate::workspace::{Dependency, DependencyDiff, Report, SourceWorkspace, WorkspaceError};

/// Recorded workspace call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceCall {
    Clone { path: PathBuf, remote: String, branch: String },
    Pull { path: PathBuf },
    Diff { workspace: PathBuf },
    CloneDependencies { count: usize },
    Prune { count: usize },
    Revision { path: PathBuf },
}

#[derive(Default)]
struct WorkspaceState {
    calls: Vec<WorkspaceCall>,
    revisions: HashMap<PathBuf, String>,
    dependencies: Vec<PathBuf>,
    diff: DependencyDiff,
    /// Served before `diff`, one per call.
    queued_diffs: VecDeque<DependencyDiff>,
    diff_error: Option<WorkspaceError>,
    failing_pulls: HashSet<PathBuf>,
    failing_revisions: HashSet<PathBuf>,
    fail_clone: bool,
    fail_clone_dependencies: bool,
    fail_prune: bool,
    pull_delays: HashMap<PathBuf, Duration>,
    pulls_in_flight: usize,
    max_pulls_in_flight: usize,
}

/// Fake workspace: revisions, dependencies and failures are scripted.
///
/// `clone_repo` creates the target directory so the engine sees a checkout
/// on the next refresh.
#[derive(Clone, Default)]
pub struct FakeWorkspace {
    inner: Arc<Mutex<WorkspaceState>>,
}

impl FakeWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<WorkspaceCall> {
        self.inner.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Number of pulls issued, root and dependencies alike.
    pub fn pull_count(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| matches!(c, WorkspaceCall::Pull { .. })).count()
    }

    pub fn clone_count(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| matches!(c, WorkspaceCall::Clone { .. })).count()
    }

    pub fn set_revision(&self, path: impl Into<PathBuf>, rev: impl Into<String>) {
        self.inner.lock().revisions.insert(path.into(), rev.into());
    }

    /// Mark an absolute path as a checked-out dependency.
    pub fn add_dependency(&self, path: impl Into<PathBuf>) {
        let mut state = self.inner.lock();
        let path = path.into();
        if !state.dependencies.contains(&path) {
            state.dependencies.push(path);
        }
    }

    /// Script the result of the next `diff_dependencies` calls.
    pub fn set_diff(&self, diff: DependencyDiff) {
        self.inner.lock().diff = diff;
    }

    /// Serve `diff` from the next `diff_dependencies` call that finds no
    /// earlier queued diff, then fall back to [`FakeWorkspace::set_diff`].
    pub fn queue_diff(&self, diff: DependencyDiff) {
        self.inner.lock().queued_diffs.push_back(diff);
    }

    pub fn fail_diff(&self, err: WorkspaceError) {
        self.inner.lock().diff_error = Some(err);
    }

    pub fn fail_pull(&self, path: impl Into<PathBuf>) {
        self.inner.lock().failing_pulls.insert(path.into());
    }

    pub fn fail_revision(&self, path: impl Into<PathBuf>) {
        self.inner.lock().failing_revisions.insert(path.into());
    }

    pub fn fail_clone(&self, fail: bool) {
        self.inner.lock().fail_clone = fail;
    }

    pub fn fail_clone_dependencies(&self, fail: bool) {
        self.inner.lock().fail_clone_dependencies = fail;
    }

    pub fn fail_prune(&self, fail: bool) {
        self.inner.lock().fail_prune = fail;
    }

    /// Number of `clone_dependencies` calls.
    pub fn dependency_clone_count(&self) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, WorkspaceCall::CloneDependencies { .. }))
            .count()
    }

    pub fn set_pull_delay(&self, path: impl Into<PathBuf>, delay: Duration) {
        self.inner.lock().pull_delays.insert(path.into(), delay);
    }

    /// Highest number of pulls observed running at once.
    pub fn max_pulls_in_flight(&self) -> usize {
        self.inner.lock().max_pulls_in_flight
    }
}

#[async_trait]
impl SourceWorkspace for FakeWorkspace {
    async fn clone_repo(&self, base_dir: &Path, path: &Path, remote: &str, branch: &str) -> Report {
        let target = base_dir.join(path);
        let fail = {
            let mut state = self.inner.lock();
            state.calls.push(WorkspaceCall::Clone {
                path: target.clone(),
                remote: remote.to_string(),
                branch: branch.to_string(),
            });
            state.fail_clone
        };
        let header = format!("$ git clone --branch {branch} {remote} {}\n", path.display());
        if fail {
            let err = WorkspaceError::CommandFailed {
                command: "git clone".to_string(),
                status: "exit status: 128".to_string(),
                stderr: format!("repository '{remote}' not found"),
            };
            return Report::failed(format!("{header}{err}\n"), err);
        }
        match std::fs::create_dir_all(&target) {
            Ok(()) => Report::ok(header),
            Err(e) => {
                let err = WorkspaceError::io(&target, e);
                Report::failed(header, err)
            }
        }
    }

    async fn pull_top(&self, path: &Path) -> Report {
        let (delay, fail) = {
            let mut state = self.inner.lock();
            state.calls.push(WorkspaceCall::Pull { path: path.to_path_buf() });
            state.pulls_in_flight += 1;
            state.max_pulls_in_flight = state.max_pulls_in_flight.max(state.pulls_in_flight);
            (state.pull_delays.get(path).copied(), state.failing_pulls.contains(path))
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.lock().pulls_in_flight -= 1;

        let header = format!("$ git -C {} pull --ff-only\n", path.display());
        if fail {
            let err = WorkspaceError::CommandFailed {
                command: format!("git -C {} pull", path.display()),
                status: "exit status: 1".to_string(),
                stderr: "could not read from remote repository".to_string(),
            };
            Report::failed(format!("{header}{err}\n"), err)
        } else {
            Report::ok(format!("{header}Already up to date.\n"))
        }
    }

    async fn diff_dependencies(&self, workspace: &Path) -> Result<DependencyDiff, WorkspaceError> {
        let mut state = self.inner.lock();
        state.calls.push(WorkspaceCall::Diff { workspace: workspace.to_path_buf() });
        if let Some(err) = &state.diff_error {
            return Err(err.clone());
        }
        match state.queued_diffs.pop_front() {
            Some(diff) => Ok(diff),
            None => Ok(state.diff.clone()),
        }
    }

    async fn clone_dependencies(&self, _workspace: &Path, insertions: &[Dependency]) -> Report {
        let mut state = self.inner.lock();
        state.calls.push(WorkspaceCall::CloneDependencies { count: insertions.len() });
        let mut output = String::new();
        if state.fail_clone_dependencies {
            let err = WorkspaceError::CommandFailed {
                command: "git clone".to_string(),
                status: "exit status: 128".to_string(),
                stderr: format!("could not clone {} dependencies", insertions.len()),
            };
            output.push_str(&format!("{err}\n"));
            return Report::failed(output, err);
        }
        for dep in insertions {
            output.push_str(&format!("$ git clone {} {}\n", dep.remote, dep.path.display()));
            if !state.dependencies.contains(&dep.path) {
                state.dependencies.push(dep.path.clone());
            }
        }
        state.diff.insertions.clear();
        Report::ok(output)
    }

    async fn prune_dependencies(&self, _workspace: &Path, deletions: &[PathBuf]) -> Report {
        let mut state = self.inner.lock();
        state.calls.push(WorkspaceCall::Prune { count: deletions.len() });
        let mut output = String::new();
        if state.fail_prune {
            let err = WorkspaceError::Io {
                path: deletions.first().cloned().unwrap_or_default(),
                message: "permission denied".to_string(),
            };
            output.push_str(&format!("{err}\n"));
            return Report::failed(output, err);
        }
        for path in deletions {
            output.push_str(&format!("removed {}\n", path.display()));
            state.dependencies.retain(|p| p != path);
        }
        state.diff.deletions.clear();
        Report::ok(output)
    }

    async fn revision_of(&self, path: &Path) -> Result<String, WorkspaceError> {
        let mut state = self.inner.lock();
        state.calls.push(WorkspaceCall::Revision { path: path.to_path_buf() });
        if state.failing_revisions.contains(path) {
            return Err(WorkspaceError::CommandFailed {
                command: format!("git -C {} rev-parse HEAD", path.display()),
                status: "exit status: 128".to_string(),
                stderr: "not a git repository".to_string(),
            });
        }
        Ok(state.revisions.get(path).cloned().unwrap_or_else(|| "initial".to_string()))
    }

    async fn dependency_paths(&self, workspace: &Path) -> Result<Vec<PathBuf>, WorkspaceError> {
        let mut paths: Vec<PathBuf> = self
            .inner
            .lock()
            .dependencies
            .iter()
            .filter(|p| p.starts_with(workspace) && p.as_path() != workspace)
            .cloned()
            .collect();
        paths.sort();
        Ok(paths)
    }
}

#[derive(Default)]
struct BuildState {
    dirs: Vec<PathBuf>,
    fail: bool,
    output: String,
    delay: Option<Duration>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Fake build runner that records invocations.
#[derive(Clone, Default)]
pub struct FakeBuildRunner {
    inner: Arc<Mutex<BuildState>>,
}

impl FakeBuildRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builds(&self) -> usize {
        self.inner.lock().dirs.len()
    }

    pub fn built_dirs(&self) -> Vec<PathBuf> {
        self.inner.lock().dirs.clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.inner.lock().fail = fail;
    }

    pub fn set_output(&self, output: impl Into<String>) {
        self.inner.lock().output = output.into();
    }

    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().delay = Some(delay);
    }

    pub fn max_in_flight(&self) -> usize {
        self.inner.lock().max_in_flight
    }
}

#[async_trait]
impl BuildRunner for FakeBuildRunner {
    async fn build(&self, dir: &Path) -> Report {
        let delay = {
            let mut state = self.inner.lock();
            state.dirs.push(dir.to_path_buf());
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.inner.lock();
        state.in_flight -= 1;
        let output = format!("$ make ci\n{}", state.output);
        if state.fail {
            let err = WorkspaceError::CommandFailed {
                command: "make ci".to_string(),
                status: "exit status: 2".to_string(),
                stderr: "build failed".to_string(),
            };
            Report::failed(output, err)
        } else {
            Report::ok(output)
        }
    }
}
