// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot of the whole job fleet.
//!
//! The daemon keeps no log of intermediate changes: the snapshot written at
//! shutdown is the only durable copy of job history, and it is loaded
//! before the daemon accepts any trigger.

use crate::migration::MigrationError;
use chrono::{DateTime, Utc};
use ci_core::FleetState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Schema version written by this build.
pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

/// Previous snapshots kept beside the live file.
pub const BACKUPS_KEPT: u32 = 3;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot file: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot contents: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot schema: {0}")]
    Migration(#[from] MigrationError),
}

/// Fleet state tagged with the schema it was written under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    pub state: FleetState,
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(state: FleetState) -> Self {
        Self { version: CURRENT_SNAPSHOT_VERSION, state, created_at: Utc::now() }
    }

    pub fn job_count(&self) -> usize {
        self.state.jobs.len()
    }
}

/// Backup slot `slot` (1-based) of the snapshot at `path`.
///
/// Slot 1 is `ci.bak`, later slots are `ci.bak.2`, `ci.bak.3`.
pub fn backup_path(path: &Path, slot: u32) -> PathBuf {
    match slot {
        0 | 1 => path.with_extension("bak"),
        n => path.with_extension(format!("bak.{n}")),
    }
}

/// Age every backup by one slot and return the freed first slot.
///
/// Whatever sat in the last slot is discarded. Missing slots are skipped.
pub(crate) fn shift_backups(path: &Path) -> PathBuf {
    let _ = fs::remove_file(backup_path(path, BACKUPS_KEPT));
    for slot in (1..BACKUPS_KEPT).rev() {
        let from = backup_path(path, slot);
        if from.exists() {
            let _ = fs::rename(&from, backup_path(path, slot + 1));
        }
    }
    backup_path(path, 1)
}
