// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency manifest: one repository per line.
//!
//! ```text
//! # path            remote                         branch
//! lib/parser        git@host:parser.git            master
//! vendor/fmt        https://host/fmt.git
//! ```
//!
//! Paths are relative to the directory holding the manifest. The branch
//! defaults to `master`.

use std::path::{Component, Path};

use super::{Dependency, WorkspaceError};

/// Manifest file name, looked up at the root of every repository.
pub const MANIFEST_FILE: &str = ".deps";

const DEFAULT_BRANCH: &str = "master";

/// Parse manifest `content` read from `manifest_path`, resolving dependency
/// paths against `base`.
pub fn parse_manifest(
    content: &str,
    manifest_path: &Path,
    base: &Path,
) -> Result<Vec<Dependency>, WorkspaceError> {
    let mut deps = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let err = |message: &str| WorkspaceError::Manifest {
            path: manifest_path.to_path_buf(),
            line: idx + 1,
            message: message.to_string(),
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        let (rel, remote, branch) = match fields.as_slice() {
            [rel, remote] => (*rel, *remote, DEFAULT_BRANCH),
            [rel, remote, branch] => (*rel, *remote, *branch),
            _ => return Err(err("expected `<path> <remote> [branch]`")),
        };

        let rel_path = Path::new(rel);
        if !rel_path.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(err("dependency path must be relative and stay inside the workspace"));
        }

        deps.push(Dependency {
            path: base.join(rel_path),
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
    }
    Ok(deps)
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
