// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;

fn resolve(file: FileConfig, debounce: Option<Duration>, hook: Option<&str>) -> Result<Config, LifecycleError> {
    Config::resolve(PathBuf::from("/state"), file, debounce, hook.map(str::to_string))
}

#[test]
fn defaults_derive_paths_from_state_dir() {
    let config = resolve(FileConfig::default(), None, None).unwrap();

    assert_eq!(config.socket_path, Path::new("/state/daemon.sock"));
    assert_eq!(config.lock_path, Path::new("/state/daemon.pid"));
    assert_eq!(config.snapshot_path, Path::new("/state/ci.db"));
    assert_eq!(config.workspaces_path, Path::new("/state/workspaces"));
    assert_eq!(config.log_path, Path::new("/state/daemon.log"));
    assert_eq!(config.debounce, DEFAULT_DEBOUNCE);
    assert_eq!(config.hook_addr, Some("0.0.0.0:8080".parse().unwrap()));
    assert_eq!(config.build_command, ["make", "ci"]);
}

#[test]
fn file_settings_apply() {
    let file = FileConfig {
        debounce_secs: Some(30),
        hook_addr: Some("off".into()),
        build_command: Some(vec!["cargo".into(), "test".into()]),
    };
    let config = resolve(file, None, None).unwrap();

    assert_eq!(config.debounce, Duration::from_secs(30));
    assert_eq!(config.hook_addr, None);
    assert_eq!(config.build_command, ["cargo", "test"]);
}

#[test]
fn environment_overrides_file() {
    let file = FileConfig { debounce_secs: Some(30), hook_addr: Some("off".into()), build_command: None };
    let config = resolve(file, Some(Duration::from_millis(250)), Some("127.0.0.1:9999")).unwrap();

    assert_eq!(config.debounce, Duration::from_millis(250));
    assert_eq!(config.hook_addr, Some("127.0.0.1:9999".parse().unwrap()));
}

#[test]
fn empty_build_command_is_rejected() {
    let file = FileConfig { build_command: Some(vec![]), ..Default::default() };
    let err = resolve(file, None, None).unwrap_err();
    assert!(matches!(err, LifecycleError::Config(ConfigError::EmptyBuildCommand)));
}

#[test]
fn bad_hook_address_is_rejected() {
    let err = resolve(FileConfig::default(), None, Some("nowhere")).unwrap_err();
    assert!(matches!(err, LifecycleError::Config(ConfigError::HookAddr(_))));
}
