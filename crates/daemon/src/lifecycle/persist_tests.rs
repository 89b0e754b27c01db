// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::engine::test_helpers::TestContext;
use ci_core::{JobStatus, RunState};

#[tokio::test]
async fn missing_snapshot_restores_nothing() {
    let ctx = TestContext::new();
    let path = ctx.workspaces_dir.join("ci.db");

    assert_eq!(restore(&ctx.registry, &path).unwrap(), Restored::default());
    assert!(ctx.registry.is_empty());
}

#[tokio::test]
async fn persisted_jobs_survive_a_restart() {
    let ctx = TestContext::new();
    let path = ctx.workspaces_dir.join("ci.db");
    ctx.registry.add_job("mrepo", "git@host:mrepo.git", "master").unwrap();
    ctx.registry.add_job("lib", "git@host:lib.git", "dev").unwrap();
    ctx.registry.job("mrepo").unwrap().run().await;

    let saved = persist(&ctx.registry, &path).unwrap();
    assert_eq!(saved.jobs, 2);

    let next = TestContext::new();
    let restored = restore(&next.registry, &path).unwrap();
    assert_eq!(restored, Restored { jobs: 2, interrupted: 0 });
    assert_eq!(next.registry.marshal(), ctx.registry.marshal());
    assert_eq!(next.registry.job_details("mrepo").unwrap().status(), JobStatus::Success);
}

#[tokio::test]
async fn running_records_are_closed_on_restore() {
    let ctx = TestContext::new();
    let path = ctx.workspaces_dir.join("ci.db");
    let mut state = ci_core::FleetState::default();
    let mut record = ci_core::JobRecord::new(ci_core::JobSpec::new("mrepo", "r", "master"));
    record.build.begin(10);
    state.jobs.push(record);
    ci_storage::Checkpointer::new(path.clone()).checkpoint_sync(&state).unwrap();

    let restored = restore(&ctx.registry, &path).unwrap();

    assert_eq!(restored, Restored { jobs: 1, interrupted: 1 });
    let job = ctx.registry.job_details("mrepo").unwrap();
    assert_eq!(job.build.state, RunState::Done);
    assert_eq!(job.status(), JobStatus::BuildFailed);
}

#[tokio::test]
async fn persist_to_unwritable_path_fails() {
    let ctx = TestContext::new();
    let blocker = ctx.workspaces_dir.join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let path = blocker.join("ci.db");

    let err = persist(&ctx.registry, &path).unwrap_err();
    assert!(matches!(err, LifecycleError::Snapshot(_)));
}
