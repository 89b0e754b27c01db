// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use thiserror::Error;

use crate::client::ClientError;

/// The daemon refused the request (unknown job, duplicate name, ...).
pub const EXIT_REJECTED: i32 = 1;
/// The daemon is not running and the command does not start it.
pub const EXIT_NOT_RUNNING: i32 = 3;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl From<ClientError> for ExitError {
    fn from(e: ClientError) -> Self {
        let code = if e.is_not_running() { EXIT_NOT_RUNNING } else { EXIT_REJECTED };
        Self::new(code, format!("ci: {e}"))
    }
}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
