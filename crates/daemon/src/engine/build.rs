// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Version-gated build.

use std::path::Path;

use ci_adapters::BuildRunner;
use ci_core::{ExecutionRecord, FAILED_ERRCODE};

/// A build is due when the last refresh succeeded with content the build
/// record has not seen yet.
pub fn needs_build(refresh: &ExecutionRecord, build: &ExecutionRecord) -> bool {
    refresh.is_done() && !refresh.failed() && refresh.version != build.version
}

/// Captured text and errcode of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub errcode: i32,
    pub output: String,
}

/// Run the build in `dir`.
pub async fn run_build<B: BuildRunner>(builder: &B, dir: &Path) -> BuildOutcome {
    let report = builder.build(dir).await;
    let mut output = format!("workspace: {}\n", dir.display());
    output.push_str(&report.output);
    match report.outcome {
        Ok(()) => BuildOutcome { errcode: 0, output },
        Err(err) => {
            output.push_str(&format!("{err}\n"));
            BuildOutcome { errcode: FAILED_ERRCODE, output }
        }
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
