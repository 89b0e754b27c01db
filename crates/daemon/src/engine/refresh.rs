// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Refresh: bring a job workspace and its dependency repositories up to date
//! and compute the content version.

use std::path::{Path, PathBuf};

use ci_adapters::{Report, SourceWorkspace, WorkspaceError};
use ci_core::{JobSpec, Version};
use futures_util::future::join_all;
use tracing::{debug, warn};

/// Result of one unit of refresh work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutcome {
    /// What the unit did, e.g. "pull lib/a"
    pub label: String,
    pub report: Report,
}

impl UnitOutcome {
    pub fn new(label: impl Into<String>, report: Report) -> Self {
        Self { label: label.into(), report }
    }
}

/// Accumulated output and failures of a refresh.
///
/// `version` is only set when every step succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub output: String,
    pub failures: Vec<WorkspaceError>,
    pub version: Option<Version>,
}

impl RefreshReport {
    fn new(dir: &Path) -> Self {
        Self { output: format!("workspace: {}\n", dir.display()), ..Default::default() }
    }

    pub fn succeeded(&self) -> bool {
        self.failures.is_empty() && self.version.is_some()
    }

    fn note(&mut self, line: impl AsRef<str>) {
        self.output.push_str(line.as_ref());
        self.output.push('\n');
    }

    /// Record a unit's output and failure. Returns whether it succeeded.
    fn absorb(&mut self, unit: UnitOutcome) -> bool {
        self.output.push_str(&unit.report.output);
        match unit.report.outcome {
            Ok(()) => true,
            Err(err) => {
                debug!(unit = %unit.label, error = %err, "refresh unit failed");
                self.failures.push(err);
                false
            }
        }
    }

    fn fail(&mut self, err: WorkspaceError) {
        self.failures.push(err);
    }

    /// Captured text for the execution record: operation output, then the
    /// failure list, then the version.
    pub fn render(&self) -> String {
        let mut text = self.output.clone();
        if !self.failures.is_empty() {
            text.push_str(&format!("{} failure(s):\n", self.failures.len()));
            for failure in &self.failures {
                text.push_str(&format!("  - {failure}\n"));
            }
        }
        if let Some(version) = &self.version {
            text.push_str(&format!("version is {version}\n"));
        }
        text
    }
}

/// Refresh the workspace of `spec` below `base_dir`.
pub async fn refresh<W: SourceWorkspace>(workspace: &W, base_dir: &Path, spec: &JobSpec) -> RefreshReport {
    let dir = base_dir.join(&spec.name);
    let mut report = RefreshReport::new(&dir);

    // A fresh clone is already current: skip the pull this cycle.
    let exists = tokio::fs::try_exists(&dir).await.unwrap_or(false);
    let top = if exists {
        report.note(format!("updating {}", spec.name));
        UnitOutcome::new(format!("pull {}", spec.name), workspace.pull_top(&dir).await)
    } else {
        report.note(format!("{} does not exist, cloning {} ({})", spec.name, spec.remote, spec.branch));
        let report = workspace.clone_repo(base_dir, Path::new(&spec.name), &spec.remote, &spec.branch).await;
        UnitOutcome::new(format!("clone {}", spec.name), report)
    };
    if !report.absorb(top) {
        return report;
    }

    report.note("updating dependency set");
    if !sync_dependency_set(workspace, &dir, &mut report).await {
        return report;
    }

    let deps = match workspace.dependency_paths(&dir).await {
        Ok(deps) => deps,
        Err(err) => {
            report.fail(err);
            return report;
        }
    };

    report.note(format!("pulling {} dependencies", deps.len()));
    let mut all_pulled = true;
    for outcome in pull_all(workspace, &deps).await {
        all_pulled &= report.absorb(outcome);
    }
    if !all_pulled {
        warn!(job = %spec.name, failures = report.failures.len(), "dependency pulls failed");
        return report;
    }

    report.note("computing version");
    compute_version(workspace, deps, &mut report).await;
    report
}

/// Levels of nested manifests followed in one refresh.
const MAX_DEPENDENCY_DEPTH: usize = 16;

/// Clone declared-but-missing dependencies and prune undeclared ones.
///
/// A freshly cloned dependency may declare more, so diff and clone repeat
/// until nothing is missing. Pruning uses the final diff and runs even if a
/// clone failed.
async fn sync_dependency_set<W: SourceWorkspace>(
    workspace: &W,
    dir: &Path,
    report: &mut RefreshReport,
) -> bool {
    let mut ok = true;
    let mut depth = 0;
    let deletions = loop {
        let diff = match workspace.diff_dependencies(dir).await {
            Ok(diff) => diff,
            Err(err) => {
                report.fail(err);
                return false;
            }
        };
        if diff.insertions.is_empty() || !ok {
            break diff.deletions;
        }
        if depth == MAX_DEPENDENCY_DEPTH {
            report.fail(WorkspaceError::TooDeep { depth });
            ok = false;
            break diff.deletions;
        }
        depth += 1;
        let cloned = workspace.clone_dependencies(dir, &diff.insertions).await;
        ok &= report.absorb(UnitOutcome::new("clone dependencies", cloned));
    };
    if !deletions.is_empty() {
        let pruned = workspace.prune_dependencies(dir, &deletions).await;
        ok &= report.absorb(UnitOutcome::new("prune dependencies", pruned));
    }
    ok
}

/// Pull every dependency concurrently, one task per repository.
async fn pull_all<W: SourceWorkspace>(workspace: &W, deps: &[PathBuf]) -> Vec<UnitOutcome> {
    let tasks = deps.iter().map(|path| {
        let workspace = workspace.clone();
        let path = path.clone();
        tokio::spawn(async move {
            let report = workspace.pull_top(&path).await;
            UnitOutcome::new(format!("pull {}", path.display()), report)
        })
    });
    join_all(tasks)
        .await
        .into_iter()
        .zip(deps)
        .map(|(joined, path)| match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                let err = WorkspaceError::Spawn {
                    command: format!("pull {}", path.display()),
                    message: e.to_string(),
                };
                UnitOutcome::new(format!("pull {}", path.display()), Report::failed("", err))
            }
        })
        .collect()
}

/// Digest of the dependency revisions in path order.
async fn compute_version<W: SourceWorkspace>(
    workspace: &W,
    mut deps: Vec<PathBuf>,
    report: &mut RefreshReport,
) {
    deps.sort();
    let mut revisions = Vec::with_capacity(deps.len());
    let mut failed = false;
    for path in &deps {
        match workspace.revision_of(path).await {
            Ok(rev) => revisions.push(rev),
            Err(err) => {
                failed = true;
                report.fail(err);
            }
        }
    }
    if !failed {
        report.version = Some(Version::digest(&revisions));
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
