// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ci list`

use std::io::Write;

use anyhow::Result;
use ci_core::JobRecord;

use crate::client::DaemonClient;
use crate::color;
use crate::exit_error::ExitError;
use crate::output::{handle_list, OutputFormat};
use crate::table::Table;

/// Hex characters of the content version shown in the table.
const VERSION_WIDTH: usize = 12;

pub async fn list(format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(ExitError::from)?;
    let jobs = client.list_jobs().await.map_err(ExitError::from)?;

    handle_list(format, &jobs, "No jobs. Add one with `ci add <name> <remote> <branch>`.", render)
}

/// Render jobs as a table; jobs arrive sorted by name.
pub(crate) fn render(jobs: &[JobRecord], out: &mut dyn Write) {
    let mut table = Table::new(vec!["STATUS", "NAME", "REMOTE", "BRANCH", "VERSION"]);
    for job in jobs {
        let version = if job.refresh.version.is_zero() {
            color::muted("-")
        } else {
            job.refresh.version.short(VERSION_WIDTH)
        };
        table.row(vec![
            color::job_status(job.status()),
            job.name.clone(),
            job.remote.clone(),
            job.branch.clone(),
            version,
        ]);
    }
    table.render(out);
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
