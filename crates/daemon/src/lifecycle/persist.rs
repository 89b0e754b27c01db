// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Moving the registry in and out of the snapshot file.

use std::path::Path;

use ci_adapters::{BuildRunner, SourceWorkspace};
use ci_core::Clock;
use ci_storage::{load_snapshot, CheckpointResult, Checkpointer};
use tracing::info;

use super::LifecycleError;
use crate::engine::Registry;

/// What startup found in the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Restored {
    pub jobs: usize,
    pub interrupted: usize,
}

/// Load the snapshot at `path`, if any, into `registry` and close runs the
/// previous process left open.
pub fn restore<W, B, C>(registry: &Registry<W, B, C>, path: &Path) -> Result<Restored, LifecycleError>
where
    W: SourceWorkspace,
    B: BuildRunner,
    C: Clock,
{
    let Some(snapshot) = load_snapshot(path)? else {
        info!("no snapshot found, starting with no jobs");
        return Ok(Restored::default());
    };
    let jobs = snapshot.state.jobs.len();
    registry.unmarshal(snapshot.state)?;
    let interrupted = registry.recover_interrupted();
    info!(jobs, interrupted, created_at = %snapshot.created_at, "restored jobs from snapshot");
    Ok(Restored { jobs, interrupted })
}

/// Write the whole registry to `path`.
pub fn persist<W, B, C>(registry: &Registry<W, B, C>, path: &Path) -> Result<CheckpointResult, LifecycleError>
where
    W: SourceWorkspace,
    B: BuildRunner,
    C: Clock,
{
    let state = registry.marshal();
    let result = Checkpointer::new(path.to_path_buf()).checkpoint_sync(&state)?;
    info!(jobs = result.jobs, size_bytes = result.size_bytes, "saved snapshot");
    Ok(result)
}

#[cfg(test)]
#[path = "persist_tests.rs"]
mod tests;
