// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Writing and loading snapshot files.
//!
//! Files are zstd-compressed JSON. A save writes a sibling temp file, fsyncs
//! it, moves the previous snapshot into the `.bak` rotation, then renames the
//! temp file into place, so a crash mid-save leaves either the old or the
//! new snapshot on disk.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use ci_core::FleetState;
use tracing::{debug, info};

use crate::migration::MigrationRegistry;
use crate::snapshot::{shift_backups, Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};

const ZSTD_LEVEL: i32 = 3;

/// Outcome of a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointResult {
    pub jobs: usize,
    pub size_bytes: u64,
}

/// Writes snapshots to a fixed path.
#[derive(Debug, Clone)]
pub struct Checkpointer {
    path: PathBuf,
}

impl Checkpointer {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Serialize, compress and durably write `state`.
    pub fn checkpoint_sync(&self, state: &FleetState) -> Result<CheckpointResult, SnapshotError> {
        let snapshot = Snapshot::new(state.clone());
        let json = serde_json::to_vec(&snapshot)?;
        let compressed = zstd::stream::encode_all(json.as_slice(), ZSTD_LEVEL)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&compressed)?;
            file.sync_all()?;
        }

        if self.path.exists() {
            let bak = shift_backups(&self.path);
            fs::rename(&self.path, &bak)?;
            debug!(backup = %bak.display(), "rotated previous snapshot");
        }
        fs::rename(&tmp_path, &self.path)?;

        Ok(CheckpointResult { jobs: state.jobs.len(), size_bytes: compressed.len() as u64 })
    }
}

/// Load the snapshot at `path`, migrating it to the current schema.
///
/// Returns `Ok(None)` when no snapshot exists.
pub fn load_snapshot(path: &Path) -> Result<Option<Snapshot>, SnapshotError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut json = Vec::new();
    zstd::stream::Decoder::new(file)?.read_to_end(&mut json)?;

    let raw: serde_json::Value = serde_json::from_slice(&json)?;
    let migrated = MigrationRegistry::new().migrate_to(raw, CURRENT_SNAPSHOT_VERSION)?;
    let snapshot: Snapshot = serde_json::from_value(migrated)?;

    info!(path = %path.display(), jobs = snapshot.job_count(), "loaded snapshot");
    Ok(Some(snapshot))
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
