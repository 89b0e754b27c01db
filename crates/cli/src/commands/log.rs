// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ci log` - refresh and build output of one job

use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Result};
use ci_core::{format_elapsed, format_elapsed_ms, ExecutionRecord, JobRecord, Phase, PhaseStatus, RunState};

use crate::client::DaemonClient;
use crate::color;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, indent, now_ms, OutputFormat};

const TAIL_INTERVAL: Duration = Duration::from_secs(2);

pub async fn log(name: &str, tail: bool, format: OutputFormat) -> Result<()> {
    if tail && format == OutputFormat::Json {
        bail!("--tail is only available with text output");
    }
    let client = DaemonClient::connect().map_err(ExitError::from)?;
    let job = client.job_details(name).await.map_err(ExitError::from)?;

    format_or_json(format, &job, || print!("{}", render(&job, now_ms())))?;
    if !tail {
        return Ok(());
    }

    let mut state = TailState::new(&job);
    let mut ticker = tokio::time::interval(TAIL_INTERVAL);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let job = client.job_details(name).await.map_err(ExitError::from)?;
        let update = state.update(&job, now_ms());
        if !update.is_empty() {
            print!("{}", update);
            std::io::stdout().flush()?;
        }
    }
}

/// One line describing where a phase stands, shown above its output.
pub(crate) fn phase_header(phase: Phase, rec: &ExecutionRecord, now_ms: u64) -> String {
    let status = PhaseStatus::from(rec);
    let ago = format_elapsed(rec.since_ms(now_ms) / 1_000);
    match status {
        PhaseStatus::Never => format!("{} {}", phase, color::phase_status(status)),
        PhaseStatus::Running => {
            format!("{} {}, started {} ago", phase, color::phase_status(status), ago)
        }
        PhaseStatus::Success | PhaseStatus::Failed => {
            format!("{} {} {} ago", phase, color::phase_status(status), ago)
        }
    }
}

/// Status, duration and age of a phase ("refresh success in 3s, 2m ago").
pub(crate) fn summary(phase: Phase, rec: &ExecutionRecord, now_ms: u64) -> String {
    let status = PhaseStatus::from(rec);
    match rec.duration_ms() {
        Some(took) => format!(
            "{} {} in {}, {} ago",
            phase,
            color::phase_status(status),
            format_elapsed_ms(took),
            format_elapsed(rec.since_ms(now_ms) / 1_000)
        ),
        None => phase_header(phase, rec, now_ms),
    }
}

fn section(phase: Phase, rec: &ExecutionRecord, now_ms: u64) -> String {
    let mut out = format!("{}\n", color::header(&phase_header(phase, rec, now_ms)));
    if !rec.result.is_empty() {
        out.push('\n');
        out.push_str(&indent(&rec.result));
    }
    out.push('\n');
    out
}

/// Full text view of a job: both phases with output, then summaries in the
/// order the phases ran.
pub(crate) fn render(job: &JobRecord, now_ms: u64) -> String {
    let mut out = section(Phase::Refresh, &job.refresh, now_ms);
    out.push_str(&section(Phase::Build, &job.build, now_ms));

    let refresh = summary(Phase::Refresh, &job.refresh, now_ms);
    let build = summary(Phase::Build, &job.build, now_ms);
    let (first, second) = if job.build.started_at_ms >= job.refresh.started_at_ms {
        (refresh, build)
    } else {
        (build, refresh)
    };
    out.push_str(&format!("{}\n{}\n", first, second));
    out
}

/// What `--tail` has already shown for one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Seen {
    started_at_ms: u64,
    state: RunState,
    printed: usize,
}

impl Seen {
    fn of(rec: &ExecutionRecord) -> Self {
        Self { started_at_ms: rec.started_at_ms, state: rec.state, printed: rec.result.len() }
    }

    /// Text describing what changed since the last poll.
    fn advance(&mut self, phase: Phase, rec: &ExecutionRecord, now_ms: u64) -> String {
        let mut out = String::new();
        let new_run = rec.started_at_ms != self.started_at_ms;
        let transitioned = new_run || rec.state != self.state;
        if new_run {
            self.printed = 0;
            out.push_str(&format!("{}\n", phase_header(phase, rec, now_ms)));
        }
        let fresh = rec.result.get(self.printed..).unwrap_or(&rec.result);
        out.push_str(&indent(fresh));
        if transitioned && rec.is_done() {
            out.push_str(&format!("{}\n", summary(phase, rec, now_ms)));
        }
        *self = Seen::of(rec);
        out
    }
}

/// Tracks both phases between polls so only new output is printed.
pub(crate) struct TailState {
    refresh: Seen,
    build: Seen,
}

impl TailState {
    pub(crate) fn new(job: &JobRecord) -> Self {
        Self { refresh: Seen::of(&job.refresh), build: Seen::of(&job.build) }
    }

    pub(crate) fn update(&mut self, job: &JobRecord, now_ms: u64) -> String {
        let mut out = self.refresh.advance(Phase::Refresh, &job.refresh, now_ms);
        out.push_str(&self.build.advance(Phase::Build, &job.build, now_ms));
        out
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
