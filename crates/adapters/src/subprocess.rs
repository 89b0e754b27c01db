// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess helper shared by the git workspace and the build runner.

use tokio::process::Command;

use crate::workspace::{Report, WorkspaceError};

/// Run `cmd` to completion and capture stdout followed by stderr.
///
/// `label` is the human-readable command line used in the report header
/// and in error messages.
pub(crate) async fn run_captured(mut cmd: Command, label: &str) -> Report {
    cmd.stdin(std::process::Stdio::null()).kill_on_drop(true);
    tracing::debug!(command = label, "running");

    let mut output = format!("$ {label}\n");
    match cmd.output().await {
        Ok(out) => {
            output.push_str(&String::from_utf8_lossy(&out.stdout));
            output.push_str(&String::from_utf8_lossy(&out.stderr));
            if !output.ends_with('\n') {
                output.push('\n');
            }
            if out.status.success() {
                Report::ok(output)
            } else {
                let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
                let err = WorkspaceError::CommandFailed {
                    command: label.to_string(),
                    status: out.status.to_string(),
                    stderr,
                };
                Report::failed(output, err)
            }
        }
        Err(e) => {
            let err =
                WorkspaceError::Spawn { command: label.to_string(), message: e.to_string() };
            output.push_str(&format!("{err}\n"));
            Report::failed(output, err)
        }
    }
}
