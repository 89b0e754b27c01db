// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine.

use std::path::PathBuf;
use std::time::Duration;

use ci_adapters::{FakeBuildRunner, FakeWorkspace};
use ci_core::FakeClock;
use tempfile::TempDir;

use super::{EngineConfig, EngineDeps, Registry};

pub(crate) const QUIET: Duration = Duration::from_secs(10);

pub(crate) type TestRegistry = Registry<FakeWorkspace, FakeBuildRunner, FakeClock>;

/// Registry over fakes plus handles to script them.
pub(crate) struct TestContext {
    pub registry: TestRegistry,
    pub workspace: FakeWorkspace,
    pub builder: FakeBuildRunner,
    pub clock: FakeClock,
    pub workspaces_dir: PathBuf,
    _dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let workspaces_dir = dir.path().join("workspaces");
        std::fs::create_dir_all(&workspaces_dir).unwrap();

        let workspace = FakeWorkspace::new();
        let builder = FakeBuildRunner::new();
        let clock = FakeClock::new();
        let deps =
            EngineDeps { workspace: workspace.clone(), builder: builder.clone(), clock: clock.clone() };
        let config = EngineConfig::new(&workspaces_dir).with_debounce(QUIET);

        Self { registry: Registry::new(deps, config), workspace, builder, clock, workspaces_dir, _dir: dir }
    }

    pub fn deps(&self) -> EngineDeps<FakeWorkspace, FakeBuildRunner, FakeClock> {
        EngineDeps {
            workspace: self.workspace.clone(),
            builder: self.builder.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn job_dir(&self, name: &str) -> PathBuf {
        self.workspaces_dir.join(name)
    }
}

/// Advance paused time and let spawned tasks run to completion.
pub(crate) async fn advance(duration: Duration) {
    tokio::time::advance(duration).await;
    settle().await;
}

/// Yield enough times for timer and run tasks to make progress.
pub(crate) async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Poll `cond` until it holds, sleeping a millisecond between checks.
pub(crate) async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..1000 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    cond()
}
