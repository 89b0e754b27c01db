// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build runner: executes a project's build procedure in its workspace.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::subprocess::run_captured;
use crate::workspace::{Report, WorkspaceError};

/// Default build command, run in the job's workspace.
pub const DEFAULT_BUILD_COMMAND: &[&str] = &["make", "ci"];

/// Adapter that runs a build.
#[async_trait]
pub trait BuildRunner: Clone + Send + Sync + 'static {
    /// Run the build in `dir`, capturing combined output.
    async fn build(&self, dir: &Path) -> Report;
}

/// Runs a fixed argv as the build.
#[derive(Clone, Debug)]
pub struct CommandBuildRunner {
    argv: Vec<String>,
}

impl CommandBuildRunner {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

impl Default for CommandBuildRunner {
    fn default() -> Self {
        Self::new(DEFAULT_BUILD_COMMAND.iter().map(|s| s.to_string()).collect())
    }
}

#[async_trait]
impl BuildRunner for CommandBuildRunner {
    async fn build(&self, dir: &Path) -> Report {
        let Some((program, args)) = self.argv.split_first() else {
            let err = WorkspaceError::Spawn {
                command: "<build>".to_string(),
                message: "build command is empty".to_string(),
            };
            return Report::failed(format!("{err}\n"), err);
        };
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(dir);
        run_captured(cmd, &self.argv.join(" ")).await
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
