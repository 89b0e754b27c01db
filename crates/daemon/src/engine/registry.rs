// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job registry: the set of tracked jobs, keyed and ordered by name.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ci_adapters::{BuildRunner, SourceWorkspace};
use ci_core::{validate_job_name, Clock, FleetState, JobNameError, JobRecord, JobSpec};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::job::Job;
use super::{EngineConfig, EngineDeps};

/// Registry errors. Each leaves the registry unchanged unless noted.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("job {0:?} already exists")]
    AlreadyExists(String),

    #[error("job {0:?} not found")]
    NotFound(String),

    #[error("job {0:?} is still being removed")]
    Removing(String),

    #[error(transparent)]
    InvalidName(#[from] JobNameError),

    /// The job is already gone from the registry when this is returned.
    #[error("removed job {name:?} but could not delete {}: {source}", .path.display())]
    RemoveWorkspace {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct Registry<W, B, C> {
    jobs: RwLock<BTreeMap<String, Arc<Job<W, B, C>>>>,
    /// Names unregistered whose workspace is not yet deleted. Always locked
    /// after `jobs`.
    removing: Mutex<BTreeSet<String>>,
    deps: EngineDeps<W, B, C>,
    config: EngineConfig,
    heartbeats: AtomicU64,
    /// Parent of every job's debounce token.
    cancel: CancellationToken,
}

impl<W, B, C> Registry<W, B, C>
where
    W: SourceWorkspace,
    B: BuildRunner,
    C: Clock,
{
    pub fn new(deps: EngineDeps<W, B, C>, config: EngineConfig) -> Self {
        Self {
            jobs: RwLock::new(BTreeMap::new()),
            removing: Mutex::new(BTreeSet::new()),
            deps,
            config,
            heartbeats: AtomicU64::new(0),
            cancel: CancellationToken::new(),
        }
    }

    #[cfg(test)]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn add_job(&self, name: &str, remote: &str, branch: &str) -> Result<(), RegistryError> {
        validate_job_name(name)?;
        let mut jobs = self.jobs.write();
        if jobs.contains_key(name) {
            return Err(RegistryError::AlreadyExists(name.to_string()));
        }
        if self.removing.lock().contains(name) {
            return Err(RegistryError::Removing(name.to_string()));
        }
        let spec = JobSpec::new(name, remote, branch);
        let job = Job::new(spec, &self.config, self.deps.clone(), self.cancel.child_token());
        jobs.insert(name.to_string(), job);
        info!(job = name, remote, branch, "job added");
        Ok(())
    }

    /// Remove a job and delete its workspace. Removing an unknown job is a
    /// no-op.
    ///
    /// Waits for an in-flight run of the job to finish before deleting.
    #[cfg(test)]
    pub async fn remove_job(&self, name: &str) -> Result<(), RegistryError> {
        match self.unregister(name) {
            Some(job) => self.delete_workspace(job).await,
            None => Ok(()),
        }
    }

    /// First half of a removal: take the job out of the registry and stop its
    /// timer. The name stays reserved until [`Registry::delete_workspace`]
    /// completes.
    pub fn unregister(&self, name: &str) -> Option<Arc<Job<W, B, C>>> {
        let mut jobs = self.jobs.write();
        let Some(job) = jobs.remove(name) else {
            debug!(job = name, "remove of unknown job ignored");
            return None;
        };
        self.removing.lock().insert(name.to_string());
        drop(jobs);
        job.stop();
        info!(job = name, "job unregistered");
        Some(job)
    }

    /// Second half of a removal: wait out any in-flight run, delete the
    /// workspace, then release the name.
    pub async fn delete_workspace(&self, job: Arc<Job<W, B, C>>) -> Result<(), RegistryError> {
        job.wait_idle().await;

        let name = job.name();
        let dir = job.dir().to_path_buf();
        let result = match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => {
                warn!(job = name, path = %dir.display(), error = %source, "failed to delete workspace");
                Err(RegistryError::RemoveWorkspace { name: name.to_string(), path: dir, source })
            }
        };
        self.removing.lock().remove(name);
        if result.is_ok() {
            info!(job = name, "job removed");
        }
        result
    }

    /// Snapshot of every job, sorted by name, with outputs optionally
    /// stripped.
    pub fn list_jobs(&self, refresh_output: bool, build_output: bool) -> Vec<JobRecord> {
        self.jobs_snapshot()
            .iter()
            .map(|job| job.to_record().with_output(refresh_output, build_output))
            .collect()
    }

    pub fn job_details(&self, name: &str) -> Result<JobRecord, RegistryError> {
        let job = self.jobs.read().get(name).cloned();
        job.map(|job| job.to_record()).ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    #[cfg(test)]
    pub fn job(&self, name: &str) -> Option<Arc<Job<W, B, C>>> {
        self.jobs.read().get(name).cloned()
    }

    /// Trigger every job.
    pub fn heartbeat(&self) {
        let count = self.heartbeats.fetch_add(1, Ordering::Relaxed) + 1;
        let jobs = self.jobs_snapshot();
        debug!(heartbeat = count, jobs = jobs.len(), "heartbeat");
        for job in jobs {
            job.trigger();
        }
    }

    pub fn heartbeats(&self) -> u64 {
        self.heartbeats.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }

    /// Full persistable state.
    pub fn marshal(&self) -> FleetState {
        FleetState { jobs: self.jobs_snapshot().iter().map(|job| job.to_record()).collect() }
    }

    /// Replace the registry contents with `state`.
    ///
    /// Rejects the whole state, leaving the registry untouched, if any name
    /// is invalid or repeated.
    pub fn unmarshal(&self, state: FleetState) -> Result<(), RegistryError> {
        let mut seen = BTreeSet::new();
        for record in &state.jobs {
            validate_job_name(&record.name)?;
            if !seen.insert(record.name.as_str()) {
                return Err(RegistryError::AlreadyExists(record.name.clone()));
            }
        }

        let jobs: BTreeMap<_, _> = state
            .jobs
            .into_iter()
            .map(|record| {
                let name = record.name.clone();
                let job =
                    Job::from_record(record, &self.config, self.deps.clone(), self.cancel.child_token());
                (name, job)
            })
            .collect();

        let previous = std::mem::replace(&mut *self.jobs.write(), jobs);
        for job in previous.values() {
            job.stop();
        }
        Ok(())
    }

    /// Close records a previous process left running. Returns how many jobs
    /// were affected.
    pub fn recover_interrupted(&self) -> usize {
        let now = self.deps.clock.epoch_ms();
        let mut recovered = 0;
        for job in self.jobs_snapshot() {
            if job.interrupt(now) {
                warn!(job = job.name(), "closed run interrupted by daemon restart");
                recovered += 1;
            }
        }
        recovered
    }

    /// Stop every debounce timer. In-flight runs are not waited for.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn jobs_snapshot(&self) -> Vec<Arc<Job<W, B, C>>> {
        self.jobs.read().values().cloned().collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
