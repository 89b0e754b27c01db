// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source workspace capability: the version-control operations the refresh
//! engine needs, behind a trait so the engine can be driven by a fake.

mod git;
mod manifest;

pub use git::GitWorkspace;
pub use manifest::{parse_manifest, MANIFEST_FILE};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from workspace operations.
///
/// Messages are owned strings so errors can be cloned into several reports.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkspaceError {
    #[error("{command} failed ({status}): {stderr}")]
    CommandFailed { command: String, status: String, stderr: String },

    #[error("failed to run {command}: {message}")]
    Spawn { command: String, message: String },

    #[error("{}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("{}:{line}: {message}", .path.display())]
    Manifest { path: PathBuf, line: usize, message: String },

    #[error("dependencies still missing after {depth} levels of manifests")]
    TooDeep { depth: usize },

    #[error("{}", join_errors(.0))]
    Multiple(Vec<WorkspaceError>),
}

fn join_errors(errors: &[WorkspaceError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

impl WorkspaceError {
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        WorkspaceError::Io { path: path.to_path_buf(), message: err.to_string() }
    }

    /// Fold several errors into one; `None` if there were none.
    pub fn combine(mut errors: Vec<WorkspaceError>) -> Option<WorkspaceError> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(WorkspaceError::Multiple(errors)),
        }
    }
}

/// Textual report of one operation plus its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub output: String,
    pub outcome: Result<(), WorkspaceError>,
}

impl Report {
    pub fn ok(output: impl Into<String>) -> Self {
        Self { output: output.into(), outcome: Ok(()) }
    }

    pub fn failed(output: impl Into<String>, err: WorkspaceError) -> Self {
        Self { output: output.into(), outcome: Err(err) }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Concatenate reports; the outcome keeps every error.
    pub fn merge(reports: impl IntoIterator<Item = Report>) -> Self {
        let mut output = String::new();
        let mut errors = Vec::new();
        for report in reports {
            output.push_str(&report.output);
            if let Err(e) = report.outcome {
                errors.push(e);
            }
        }
        match WorkspaceError::combine(errors) {
            Some(err) => Report::failed(output, err),
            None => Report::ok(output),
        }
    }
}

/// A repository declared in a dependency manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dependency {
    /// Absolute checkout path
    pub path: PathBuf,
    pub remote: String,
    pub branch: String,
}

/// Difference between declared and checked-out dependency repositories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyDiff {
    /// Declared but not present
    pub insertions: Vec<Dependency>,
    /// Present but no longer declared
    pub deletions: Vec<PathBuf>,
}

impl DependencyDiff {
    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty() && self.deletions.is_empty()
    }
}

/// Version-control operations on a job workspace.
///
/// Every path is absolute. Implementations must be cheap to clone: the
/// refresh engine hands a clone to each concurrent dependency pull.
#[async_trait]
pub trait SourceWorkspace: Clone + Send + Sync + 'static {
    /// Clone `remote` at `branch` into `base_dir/path`.
    async fn clone_repo(&self, base_dir: &Path, path: &Path, remote: &str, branch: &str)
        -> Report;

    /// Pull the repository at `path` only, not its dependencies.
    async fn pull_top(&self, path: &Path) -> Report;

    /// Compare declared dependencies with the repositories on disk.
    async fn diff_dependencies(&self, workspace: &Path) -> Result<DependencyDiff, WorkspaceError>;

    /// Clone every inserted dependency.
    async fn clone_dependencies(&self, workspace: &Path, insertions: &[Dependency]) -> Report;

    /// Delete every removed dependency checkout.
    async fn prune_dependencies(&self, workspace: &Path, deletions: &[PathBuf]) -> Report;

    /// Current revision identifier of the repository at `path`.
    async fn revision_of(&self, path: &Path) -> Result<String, WorkspaceError>;

    /// Every dependency repository below `workspace` (the root excluded).
    async fn dependency_paths(&self, workspace: &Path) -> Result<Vec<PathBuf>, WorkspaceError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
