// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::record::{RunState, FAILED_ERRCODE};
use crate::version::Version;

fn rec(state: RunState, errcode: i32, version: &str) -> ExecutionRecord {
    ExecutionRecord {
        state,
        errcode,
        version: if version.is_empty() { Version::ZERO } else { Version::digest([version]) },
        ..Default::default()
    }
}

#[yare::parameterized(
    fresh_job          = { rec(RunState::Idle, 0, ""),                rec(RunState::Idle, 0, ""),                JobStatus::Success },
    pulling            = { rec(RunState::Running, 0, "a"),            rec(RunState::Done, 0, "a"),               JobStatus::Pulling },
    pulling_wins       = { rec(RunState::Running, 0, "b"),            rec(RunState::Running, 0, "a"),            JobStatus::Pulling },
    building           = { rec(RunState::Done, 0, "b"),               rec(RunState::Running, 0, "a"),            JobStatus::Building },
    need_build         = { rec(RunState::Done, 0, "b"),               rec(RunState::Done, 0, "a"),               JobStatus::NeedBuild },
    pull_failed        = { rec(RunState::Done, FAILED_ERRCODE, "a"),  rec(RunState::Done, 0, "a"),               JobStatus::PullFailed },
    build_failed       = { rec(RunState::Done, 0, "a"),               rec(RunState::Done, FAILED_ERRCODE, "a"),  JobStatus::BuildFailed },
    both_failed        = { rec(RunState::Done, FAILED_ERRCODE, "a"),  rec(RunState::Done, FAILED_ERRCODE, "a"),  JobStatus::PullFailed },
    success            = { rec(RunState::Done, 0, "a"),               rec(RunState::Done, 0, "a"),               JobStatus::Success },
)]
fn derive_job_status(refresh: ExecutionRecord, build: ExecutionRecord, expected: JobStatus) {
    assert_eq!(JobStatus::derive(&refresh, &build), expected);
}

#[yare::parameterized(
    pulling      = { JobStatus::Pulling,     "Pulling" },
    building     = { JobStatus::Building,    "Building" },
    need_build   = { JobStatus::NeedBuild,   "Need Build" },
    pull_failed  = { JobStatus::PullFailed,  "Pulling Failed" },
    build_failed = { JobStatus::BuildFailed, "Building Failed" },
    success      = { JobStatus::Success,     "Success" },
)]
fn job_status_display(status: JobStatus, expected: &str) {
    assert_eq!(status.to_string(), expected);
}

#[yare::parameterized(
    never   = { RunState::Idle,    0,              PhaseStatus::Never },
    running = { RunState::Running, 0,              PhaseStatus::Running },
    failed  = { RunState::Done,    FAILED_ERRCODE, PhaseStatus::Failed },
    success = { RunState::Done,    0,              PhaseStatus::Success },
)]
fn phase_status_from_record(state: RunState, errcode: i32, expected: PhaseStatus) {
    assert_eq!(PhaseStatus::from(&rec(state, errcode, "")), expected);
}
