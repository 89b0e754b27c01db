// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git-backed source workspace.
//!
//! Dependencies are declared in `.deps` manifests (see [`super::manifest`]).
//! The root manifest and the manifest of every checked-out dependency are
//! read, so dependencies of dependencies are tracked as well.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use super::manifest::{parse_manifest, MANIFEST_FILE};
use super::{Dependency, DependencyDiff, Report, SourceWorkspace, WorkspaceError};
use crate::subprocess::run_captured;

/// Source workspace that shells out to `git`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GitWorkspace;

impl GitWorkspace {
    pub fn new() -> Self {
        Self
    }
}

fn git(dir: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C")
        .arg(dir)
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
        .env("GIT_TERMINAL_PROMPT", "0");
    cmd
}

async fn clone_one(base_dir: &Path, path: &Path, remote: &str, branch: &str) -> Report {
    if let Some(parent) = base_dir.join(path).parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            let err = WorkspaceError::io(parent, e);
            return Report::failed(format!("{err}\n"), err);
        }
    }
    let mut cmd = git(base_dir);
    cmd.args(["clone", "--branch", branch, remote]).arg(path);
    let label = format!("git clone --branch {branch} {remote} {}", path.display());
    run_captured(cmd, &label).await
}

/// Read the manifest of the repository at `repo`, if any.
async fn read_manifest(repo: &Path) -> Result<Vec<Dependency>, WorkspaceError> {
    let manifest_path = repo.join(MANIFEST_FILE);
    match tokio::fs::read_to_string(&manifest_path).await {
        Ok(content) => parse_manifest(&content, &manifest_path, repo),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(WorkspaceError::io(&manifest_path, e)),
    }
}

/// Collect every directory below `root` holding a `.git` entry.
///
/// Descends into found repositories (dependencies may nest) but never into
/// `.git` directories themselves.
fn find_repositories(root: &Path) -> Result<Vec<PathBuf>, WorkspaceError> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|e| WorkspaceError::io(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| WorkspaceError::io(&dir, e))?;
            let file_type = entry.file_type().map_err(|e| WorkspaceError::io(&entry.path(), e))?;
            if !file_type.is_dir() || entry.file_name() == ".git" {
                continue;
            }
            let path = entry.path();
            if path.join(".git").exists() {
                found.push(path.clone());
            }
            pending.push(path);
        }
    }
    found.sort();
    Ok(found)
}

#[async_trait]
impl SourceWorkspace for GitWorkspace {
    async fn clone_repo(
        &self,
        base_dir: &Path,
        path: &Path,
        remote: &str,
        branch: &str,
    ) -> Report {
        clone_one(base_dir, path, remote, branch).await
    }

    async fn pull_top(&self, path: &Path) -> Report {
        let mut cmd = git(path);
        cmd.args(["pull", "--ff-only"]);
        run_captured(cmd, &format!("git -C {} pull --ff-only", path.display())).await
    }

    async fn diff_dependencies(&self, workspace: &Path) -> Result<DependencyDiff, WorkspaceError> {
        let present = self.dependency_paths(workspace).await?;

        let mut declared = read_manifest(workspace).await?;
        for repo in &present {
            declared.extend(read_manifest(repo).await?);
        }
        declared.sort();
        declared.dedup_by(|a, b| a.path == b.path);

        let present_set: BTreeSet<&PathBuf> = present.iter().collect();
        let declared_set: BTreeSet<&PathBuf> = declared.iter().map(|d| &d.path).collect();

        let insertions =
            declared.iter().filter(|d| !present_set.contains(&d.path)).cloned().collect();
        // A repository nested inside a declared one belongs to it, not to us.
        let deletions = present
            .iter()
            .filter(|p| !declared_set.contains(p))
            .filter(|p| !declared_set.iter().any(|d| p.starts_with(d) && p != d))
            .cloned()
            .collect();

        Ok(DependencyDiff { insertions, deletions })
    }

    async fn clone_dependencies(&self, workspace: &Path, insertions: &[Dependency]) -> Report {
        let mut reports = Vec::with_capacity(insertions.len());
        for dep in insertions {
            let rel = dep.path.strip_prefix(workspace).unwrap_or(&dep.path);
            reports.push(clone_one(workspace, rel, &dep.remote, &dep.branch).await);
        }
        Report::merge(reports)
    }

    async fn prune_dependencies(&self, _workspace: &Path, deletions: &[PathBuf]) -> Report {
        let mut reports = Vec::with_capacity(deletions.len());
        for path in deletions {
            let header = format!("prune {}\n", path.display());
            let report = match tokio::fs::remove_dir_all(path).await {
                Ok(()) => Report::ok(header),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Report::ok(header),
                Err(e) => {
                    let err = WorkspaceError::io(path, e);
                    Report::failed(format!("{header}{err}\n"), err)
                }
            };
            reports.push(report);
        }
        Report::merge(reports)
    }

    async fn revision_of(&self, path: &Path) -> Result<String, WorkspaceError> {
        let label = format!("git -C {} rev-parse HEAD", path.display());
        let output = git(path)
            .args(["rev-parse", "HEAD"])
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|e| WorkspaceError::Spawn { command: label.clone(), message: e.to_string() })?;
        if !output.status.success() {
            return Err(WorkspaceError::CommandFailed {
                command: label,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn dependency_paths(&self, workspace: &Path) -> Result<Vec<PathBuf>, WorkspaceError> {
        let root = workspace.to_path_buf();
        tokio::task::spawn_blocking(move || find_repositories(&root)).await.map_err(|e| {
            WorkspaceError::Io { path: workspace.to_path_buf(), message: e.to_string() }
        })?
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
