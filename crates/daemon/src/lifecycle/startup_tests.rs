// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::lifecycle::FileConfig;
use ci_core::{FleetState, JobRecord, JobSpec};
use std::path::Path;
use std::time::Duration;
use fs2::FileExt;
use tempfile::tempdir;

fn test_config(state_dir: &Path) -> Config {
    let mut config =
        Config::resolve(state_dir.to_path_buf(), FileConfig::default(), Some(Duration::from_secs(10)), Some("off".into()))
            .unwrap();
    // Keep the socket path short enough for sun_path.
    config.socket_path = state_dir.join("d.sock");
    config
}

#[tokio::test]
async fn startup_creates_runtime_files() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let result = startup(&config).await.unwrap();

    assert!(config.socket_path.exists());
    assert!(config.workspaces_path.is_dir());
    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert_eq!(std::fs::read_to_string(&config.version_path).unwrap(), ci_wire::PROTOCOL_VERSION);
    assert!(result.hook.is_none());
    assert!(result.daemon.registry.is_empty());
}

#[tokio::test]
async fn startup_restores_snapshot() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let mut record = JobRecord::new(JobSpec::new("mrepo", "git@host:mrepo.git", "master"));
    record.refresh.begin(1);
    let state = FleetState { jobs: vec![record] };
    ci_storage::Checkpointer::new(config.snapshot_path.clone()).checkpoint_sync(&state).unwrap();

    let result = startup(&config).await.unwrap();

    let job = result.daemon.registry.job_details("mrepo").unwrap();
    assert!(job.refresh.is_done());
    assert!(job.refresh.failed());
}

#[tokio::test]
async fn shutdown_saves_snapshot_and_removes_runtime_files() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let result = startup(&config).await.unwrap();
    result.daemon.registry.add_job("mrepo", "git@host:mrepo.git", "master").unwrap();

    result.daemon.shutdown().unwrap();

    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
    assert!(!config.version_path.exists());
    let snapshot = ci_storage::load_snapshot(&config.snapshot_path).unwrap().unwrap();
    assert_eq!(snapshot.state.jobs.len(), 1);
    assert_eq!(snapshot.state.jobs[0].name, "mrepo");
}

#[tokio::test]
async fn corrupt_snapshot_fails_startup_and_cleans_up() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::write(&config.snapshot_path, b"not zstd").unwrap();

    let err = startup(&config).await.err().unwrap();

    assert!(matches!(err, LifecycleError::Snapshot(_)));
    assert!(!config.lock_path.exists());
    assert!(!config.version_path.exists());
}

#[tokio::test]
async fn startup_lock_failed_does_not_remove_existing_files() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::create_dir_all(&config.state_dir).unwrap();
    std::fs::write(&config.socket_path, b"").unwrap();
    std::fs::write(&config.version_path, b"0.1.0").unwrap();

    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)
        .unwrap();
    lock_file.lock_exclusive().unwrap();
    std::fs::write(&config.lock_path, b"12345").unwrap();

    match startup(&config).await {
        Err(LifecycleError::LockFailed(_)) => {}
        Err(e) => panic!("expected LockFailed, got: {e}"),
        Ok(_) => panic!("expected LockFailed, but startup succeeded"),
    }

    assert!(config.socket_path.exists());
    assert!(config.version_path.exists());
    assert_eq!(std::fs::read_to_string(&config.lock_path).unwrap(), "12345");
}
