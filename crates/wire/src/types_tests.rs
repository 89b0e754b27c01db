// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ci_core::{JobRecord, JobSpec, RunState, Version};

#[test]
fn request_is_tagged_by_type() {
    let json = serde_json::to_string(&Request::HeartBeat).unwrap();
    assert_eq!(json, r#"{"type":"HeartBeat"}"#);
}

#[test]
fn list_jobs_flags_default_to_false() {
    let request: Request = serde_json::from_str(r#"{"type":"ListJobs"}"#).unwrap();
    assert_eq!(request, Request::ListJobs { refresh_output: false, build_output: false });
}

#[test]
fn status_heartbeats_default_to_zero() {
    let response: Response =
        serde_json::from_str(r#"{"type":"Status","uptime_secs":3,"jobs":2}"#).unwrap();
    assert_eq!(response, Response::Status { uptime_secs: 3, jobs: 2, heartbeats: 0 });
}

#[test]
fn job_response_carries_full_record() {
    let mut job = JobRecord::new(JobSpec::new("mrepo", "git@host:mrepo.git", "master"));
    job.refresh.state = RunState::Running;
    job.refresh.result = "updating job's directory\n".into();
    job.build.version = Version::digest(["abc"]);

    let response = Response::Job { job: Box::new(job) };
    let back: Response = decode(&encode(&response).unwrap()).unwrap();
    assert_eq!(back, response);
}

#[test]
fn error_helper_builds_error_variant() {
    assert_eq!(Response::error("nope"), Response::Error { message: "nope".into() });
}
