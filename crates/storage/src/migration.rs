// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot schema migrations.
//!
//! Snapshots are migrated as raw JSON before being deserialized, so a
//! migration can rename or reshape fields freely.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("snapshot version {0} is newer than supported ({1})")]
    TooNew(u32, u32),
    #[error("no migration path from version {0} to {1}")]
    NoPath(u32, u32),
    #[error("snapshot has no version field")]
    MissingVersion,
    #[error("migration failed: {0}")]
    Failed(String),
}

/// Rewrites a snapshot written under `from()` into the layout of `from() + 1`.
pub trait Migration: Send + Sync {
    fn from(&self) -> u32;
    fn apply(&self, snapshot: &mut Value) -> Result<(), MigrationError>;
}

/// Known migrations, keyed by the schema version they upgrade from.
#[derive(Default)]
pub struct MigrationRegistry {
    steps: BTreeMap<u32, Box<dyn Migration>>,
}

impl MigrationRegistry {
    /// Every migration shipped in this build. Empty while the first schema
    /// is still current.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, step: impl Migration + 'static) {
        self.steps.insert(step.from(), Box::new(step));
    }

    /// Upgrade `snapshot` one version at a time until it reaches `target`.
    pub fn migrate_to(&self, mut snapshot: Value, target: u32) -> Result<Value, MigrationError> {
        let mut version = version_of(&snapshot)?;
        if version > target {
            return Err(MigrationError::TooNew(version, target));
        }

        for from in version..target {
            let step = self.steps.get(&from).ok_or(MigrationError::NoPath(from, target))?;
            step.apply(&mut snapshot)?;
            version = from + 1;
            match snapshot.as_object_mut() {
                Some(obj) => obj.insert("v".into(), version.into()),
                None => return Err(MigrationError::Failed(format!("v{from} step left a non-object"))),
            };
        }

        Ok(snapshot)
    }
}

fn version_of(snapshot: &Value) -> Result<u32, MigrationError> {
    snapshot
        .get("v")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or(MigrationError::MissingVersion)
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
