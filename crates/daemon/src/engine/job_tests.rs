// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::engine::test_helpers::{settle, wait_until, TestContext};
use ci_adapters::{FakeBuildRunner, FakeWorkspace};
use ci_core::{FakeClock, JobStatus, PhaseStatus, RunState, Version};
use std::time::Duration;

type TestJob = Job<FakeWorkspace, FakeBuildRunner, FakeClock>;

fn job(ctx: &TestContext, name: &str) -> Arc<TestJob> {
    Job::new(
        JobSpec::new(name, "git@host:mrepo.git", "master"),
        ctx.registry.config(),
        ctx.deps(),
        CancellationToken::new(),
    )
}

#[tokio::test]
async fn first_run_clones_and_builds() {
    let ctx = TestContext::new();
    let job = job(&ctx, "mrepo");

    job.run().await;

    let record = job.to_record();
    assert_eq!(ctx.workspace.clone_count(), 1);
    assert_eq!(ctx.workspace.pull_count(), 0);
    assert_eq!(ctx.builder.builds(), 1);
    assert_eq!(record.refresh.version, Version::digest(Vec::<String>::new()));
    assert_eq!(record.build.version, record.refresh.version);
    assert_eq!(PhaseStatus::from(&record.refresh), PhaseStatus::Success);
    assert_eq!(PhaseStatus::from(&record.build), PhaseStatus::Success);
    assert_eq!(job.status(), JobStatus::Success);
}

#[tokio::test]
async fn unchanged_content_skips_the_build() {
    let ctx = TestContext::new();
    let job = job(&ctx, "mrepo");

    job.run().await;
    job.run().await;

    assert_eq!(ctx.workspace.pull_count(), 1);
    assert_eq!(ctx.builder.builds(), 1);
    assert_eq!(job.status(), JobStatus::Success);
}

#[tokio::test]
async fn changed_dependency_triggers_a_rebuild() {
    let ctx = TestContext::new();
    let job = job(&ctx, "mrepo");
    let dep = ctx.job_dir("mrepo").join("lib/a");
    ctx.workspace.add_dependency(&dep);
    ctx.workspace.set_revision(&dep, "r1");

    job.run().await;
    let first = job.to_record().build.version;
    ctx.workspace.set_revision(&dep, "r2");
    job.run().await;

    assert_eq!(ctx.builder.builds(), 2);
    assert_ne!(job.to_record().build.version, first);
}

#[tokio::test]
async fn failed_refresh_does_not_build() {
    let ctx = TestContext::new();
    let job = job(&ctx, "mrepo");
    ctx.workspace.fail_clone(true);

    job.run().await;

    let record = job.to_record();
    assert_eq!(ctx.builder.builds(), 0);
    assert_eq!(record.refresh.errcode, FAILED_ERRCODE);
    assert!(record.refresh.version.is_zero());
    assert_eq!(job.status(), JobStatus::PullFailed);
}

#[tokio::test]
async fn failed_build_still_advances_the_build_version() {
    let ctx = TestContext::new();
    let job = job(&ctx, "mrepo");
    ctx.builder.set_fail(true);

    job.run().await;
    let record = job.to_record();
    assert_eq!(record.build.errcode, FAILED_ERRCODE);
    assert_eq!(record.build.version, record.refresh.version);
    assert_eq!(job.status(), JobStatus::BuildFailed);

    job.run().await;
    assert_eq!(ctx.builder.builds(), 1);
}

#[tokio::test(start_paused = true)]
async fn overlapping_runs_are_serialized() {
    let ctx = TestContext::new();
    ctx.clock.tick(1);
    let dir = ctx.job_dir("mrepo");
    std::fs::create_dir_all(&dir).unwrap();
    ctx.workspace.set_pull_delay(&dir, Duration::from_secs(5));
    ctx.builder.set_delay(Duration::from_secs(30));
    let job = job(&ctx, "mrepo");

    tokio::join!(job.run(), job.run());

    assert_eq!(ctx.workspace.pull_count(), 2);
    assert_eq!(ctx.workspace.max_pulls_in_flight(), 1);
    assert_eq!(ctx.builder.max_in_flight(), 1);
    // Second run only refreshed; it started after the first build ended.
    let record = job.to_record();
    assert_eq!(ctx.builder.builds(), 1);
    assert!(record.refresh.started_at_ms > record.build.finished_at_ms);
}

#[tokio::test(start_paused = true)]
async fn snapshot_during_refresh_reports_pulling() {
    let ctx = TestContext::new();
    let dir = ctx.job_dir("mrepo");
    std::fs::create_dir_all(&dir).unwrap();
    ctx.workspace.set_pull_delay(&dir, Duration::from_secs(60));
    let job = job(&ctx, "mrepo");

    let running = Arc::clone(&job);
    let handle = tokio::spawn(async move { running.run().await });
    assert!(wait_until(|| ctx.workspace.pull_count() == 1).await);
    settle().await;

    assert_eq!(job.to_record().refresh.state, RunState::Running);
    assert_eq!(job.status(), JobStatus::Pulling);

    handle.await.unwrap();
    assert_eq!(job.to_record().refresh.state, RunState::Done);
}

#[tokio::test]
async fn interrupt_closes_running_records() {
    let ctx = TestContext::new();
    let mut record = JobRecord::new(JobSpec::new("mrepo", "r", "master"));
    record.refresh.begin(500);
    let job: Arc<TestJob> =
        Job::from_record(record, ctx.registry.config(), ctx.deps(), CancellationToken::new());

    assert!(job.interrupt(900));
    assert!(!job.interrupt(950));

    let refresh = job.to_record().refresh;
    assert_eq!(refresh.state, RunState::Done);
    assert_eq!(refresh.finished_at_ms, 900);
    assert!(refresh.result.ends_with("interrupted by daemon restart\n"));
}

#[tokio::test]
async fn refresh_alone_reports_a_pending_build() {
    let ctx = TestContext::new();
    let job = job(&ctx, "mrepo");

    assert!(job.refresh().await);
    assert_eq!(job.status(), JobStatus::NeedBuild);

    job.build().await;
    assert_eq!(job.status(), JobStatus::Success);
}
