// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_record_is_idle() {
    let rec = ExecutionRecord::default();
    assert_eq!(rec.state, RunState::Idle);
    assert!(!rec.has_run());
    assert!(!rec.is_running());
    assert!(rec.version.is_zero());
    assert_eq!(rec.duration_ms(), None);
}

#[test]
fn begin_clears_outcome_but_keeps_version() {
    let mut rec = ExecutionRecord {
        errcode: FAILED_ERRCODE,
        result: "old output".into(),
        version: Version::digest(["abc"]),
        ..Default::default()
    };
    rec.begin(5_000);

    assert!(rec.is_running());
    assert_eq!(rec.started_at_ms, 5_000);
    assert_eq!(rec.errcode, 0);
    assert!(rec.result.is_empty());
    assert_eq!(rec.version, Version::digest(["abc"]));
}

#[test]
fn finish_records_outcome() {
    let mut rec = ExecutionRecord::default();
    rec.begin(1_000);
    rec.finish(4_500, FAILED_ERRCODE, "boom\n".into());

    assert!(rec.is_done());
    assert!(rec.failed());
    assert_eq!(rec.duration_ms(), Some(3_500));
    assert_eq!(rec.result, "boom\n");
}

#[yare::parameterized(
    idle    = { RunState::Idle,    10_000, 0 },
    running = { RunState::Running, 10_000, 9_000 },
    done    = { RunState::Done,    10_000, 7_000 },
)]
fn since_depends_on_state(state: RunState, now: u64, expected: u64) {
    let rec = ExecutionRecord { started_at_ms: 1_000, finished_at_ms: 3_000, state, ..Default::default() };
    assert_eq!(rec.since_ms(now), expected);
}

#[test]
fn interrupt_closes_running_record() {
    let mut rec = ExecutionRecord::default();
    rec.begin(1_000);
    rec.result.push_str("pulling");

    assert!(rec.interrupt(2_000));
    assert!(rec.is_done());
    assert_eq!(rec.errcode, FAILED_ERRCODE);
    assert_eq!(rec.result, "pulling\ninterrupted by daemon restart\n");
}

#[test]
fn interrupt_ignores_finished_record() {
    let mut rec = ExecutionRecord::default();
    rec.begin(1_000);
    rec.finish(2_000, 0, "ok".into());
    let before = rec.clone();

    assert!(!rec.interrupt(3_000));
    assert_eq!(rec, before);
}

#[test]
fn without_output_keeps_everything_else() {
    let rec = ExecutionRecord {
        started_at_ms: 1,
        finished_at_ms: 2,
        state: RunState::Done,
        errcode: 3,
        result: "text".into(),
        version: Version::digest(["v"]),
    };
    let stripped = rec.without_output();
    assert!(stripped.result.is_empty());
    assert_eq!(stripped, ExecutionRecord { result: String::new(), ..rec });
}

#[test]
fn missing_fields_deserialize_to_defaults() {
    let rec: ExecutionRecord = serde_json::from_str("{}").unwrap();
    assert_eq!(rec, ExecutionRecord::default());
}
