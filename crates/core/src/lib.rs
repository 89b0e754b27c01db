// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ci-core: shared domain types for the ci daemon and its client

pub mod macros;

pub mod clock;
pub mod job;
pub mod record;
pub mod status;
pub mod time_fmt;
pub mod version;

pub use clock::{Clock, FakeClock, SystemClock};
pub use job::{validate_job_name, FleetState, JobNameError, JobRecord, JobSpec};
pub use record::{ExecutionRecord, Phase, RunState, FAILED_ERRCODE};
pub use status::{JobStatus, PhaseStatus};
pub use time_fmt::{format_elapsed, format_elapsed_ms};
pub use version::{Version, VersionParseError, VERSION_LEN};
