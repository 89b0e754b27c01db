// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A tracked project: its records, its debounce timer and its run gate.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use ci_adapters::{BuildRunner, SourceWorkspace};
use ci_core::{Clock, ExecutionRecord, JobRecord, JobSpec, FAILED_ERRCODE};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::build::{needs_build, run_build};
use super::debounce::Debouncer;
use super::refresh::refresh;
use super::{EngineConfig, EngineDeps};

#[derive(Debug, Clone, Default)]
struct Records {
    refresh: ExecutionRecord,
    build: ExecutionRecord,
}

pub struct Job<W, B, C> {
    spec: JobSpec,
    base_dir: PathBuf,
    dir: PathBuf,
    records: RwLock<Records>,
    /// Held from the start of a refresh to the end of its build.
    gate: tokio::sync::Mutex<()>,
    debouncer: Debouncer,
    deps: EngineDeps<W, B, C>,
}

impl<W, B, C> Job<W, B, C>
where
    W: SourceWorkspace,
    B: BuildRunner,
    C: Clock,
{
    /// Create a job with empty records.
    pub fn new(
        spec: JobSpec,
        config: &EngineConfig,
        deps: EngineDeps<W, B, C>,
        cancel: CancellationToken,
    ) -> Arc<Self> {
        Self::from_parts(spec, Records::default(), config, deps, cancel)
    }

    /// Rebuild a job from its persisted record.
    pub fn from_record(
        record: JobRecord,
        config: &EngineConfig,
        deps: EngineDeps<W, B, C>,
        cancel: CancellationToken,
    ) -> Arc<Self> {
        let spec = record.spec();
        let records = Records { refresh: record.refresh, build: record.build };
        Self::from_parts(spec, records, config, deps, cancel)
    }

    fn from_parts(
        spec: JobSpec,
        records: Records,
        config: &EngineConfig,
        deps: EngineDeps<W, B, C>,
        cancel: CancellationToken,
    ) -> Arc<Self> {
        let base_dir = config.workspaces_dir.clone();
        let dir = base_dir.join(&spec.name);
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let debouncer = Debouncer::spawn(config.debounce, cancel, move || {
                if let Some(job) = weak.upgrade() {
                    tokio::spawn(async move { job.run().await });
                }
            });
            Self {
                spec,
                base_dir,
                dir,
                records: RwLock::new(records),
                gate: tokio::sync::Mutex::new(()),
                debouncer,
                deps,
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Workspace directory of this job.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Schedule a run after the quiet period; returns immediately.
    pub fn trigger(&self) {
        self.debouncer.trigger();
    }

    /// Stop the debounce timer. Runs already started finish normally.
    pub fn stop(&self) {
        self.debouncer.stop();
    }

    /// Run refresh, then build if the refresh produced new content.
    pub async fn run(&self) {
        let _gate = self.gate.lock().await;
        if self.refresh_locked().await {
            self.build_locked().await;
        }
    }

    /// Refresh only. Returns whether a build is now due.
    #[cfg(test)]
    pub async fn refresh(&self) -> bool {
        let _gate = self.gate.lock().await;
        self.refresh_locked().await
    }

    /// Build without consulting the version gate.
    #[cfg(test)]
    pub async fn build(&self) {
        let _gate = self.gate.lock().await;
        self.build_locked().await;
    }

    async fn refresh_locked(&self) -> bool {
        self.records.write().refresh.begin(self.deps.clock.epoch_ms());
        info!(job = %self.spec.name, "refresh started");

        let report = refresh(&self.deps.workspace, &self.base_dir, &self.spec).await;

        let mut records = self.records.write();
        let errcode = if report.succeeded() { 0 } else { FAILED_ERRCODE };
        records.refresh.finish(self.deps.clock.epoch_ms(), errcode, report.render());
        if let Some(version) = report.version {
            records.refresh.version = version;
        }
        if report.succeeded() {
            info!(job = %self.spec.name, version = %records.refresh.version.short(12), "refresh done");
        } else {
            warn!(job = %self.spec.name, failures = report.failures.len(), "refresh failed");
        }
        needs_build(&records.refresh, &records.build)
    }

    async fn build_locked(&self) {
        let version = {
            let mut records = self.records.write();
            records.build.begin(self.deps.clock.epoch_ms());
            records.refresh.version
        };
        info!(job = %self.spec.name, version = %version.short(12), "build started");

        let outcome = run_build(&self.deps.builder, &self.dir).await;

        let mut records = self.records.write();
        records.build.finish(self.deps.clock.epoch_ms(), outcome.errcode, outcome.output);
        records.build.version = version;
        if outcome.errcode == 0 {
            info!(job = %self.spec.name, "build succeeded");
        } else {
            warn!(job = %self.spec.name, errcode = outcome.errcode, "build failed");
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> ci_core::JobStatus {
        let records = self.records.read();
        ci_core::JobStatus::derive(&records.refresh, &records.build)
    }

    /// Copy of the full job state, output included.
    pub fn to_record(&self) -> JobRecord {
        let records = self.records.read().clone();
        JobRecord {
            name: self.spec.name.clone(),
            remote: self.spec.remote.clone(),
            branch: self.spec.branch.clone(),
            refresh: records.refresh,
            build: records.build,
        }
    }

    /// Close records left running by a previous daemon process.
    pub(crate) fn interrupt(&self, now_ms: u64) -> bool {
        let mut records = self.records.write();
        let refresh = records.refresh.interrupt(now_ms);
        let build = records.build.interrupt(now_ms);
        refresh || build
    }

    /// Wait for any in-flight run to finish.
    pub(crate) async fn wait_idle(&self) {
        let _gate = self.gate.lock().await;
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
