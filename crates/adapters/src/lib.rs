// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ci-adapters: the version-control and build capabilities the engine drives.

pub mod build;
mod subprocess;
pub mod workspace;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake;

pub use build::{BuildRunner, CommandBuildRunner, DEFAULT_BUILD_COMMAND};
pub use workspace::{
    parse_manifest, Dependency, DependencyDiff, GitWorkspace, Report, SourceWorkspace,
    WorkspaceError, MANIFEST_FILE,
};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeBuildRunner, FakeWorkspace, WorkspaceCall};
