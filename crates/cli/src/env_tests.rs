// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn clear() {
    std::env::remove_var("CI_STATE_DIR");
    std::env::remove_var("XDG_STATE_HOME");
}

#[test]
#[serial]
fn explicit_state_dir_wins() {
    clear();
    std::env::set_var("CI_STATE_DIR", "/tmp/ci-explicit");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/ci-explicit"));
    assert_eq!(socket_path().unwrap(), PathBuf::from("/tmp/ci-explicit/daemon.sock"));
    clear();
}

#[test]
#[serial]
fn xdg_state_home_is_next() {
    clear();
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/xdg/ci"));
    clear();
}

#[test]
#[serial]
fn ipc_timeout_override() {
    std::env::set_var("CI_IPC_TIMEOUT_MS", "250");
    assert_eq!(ipc_timeout(), Duration::from_millis(250));
    std::env::set_var("CI_IPC_TIMEOUT_MS", "soon");
    assert_eq!(ipc_timeout(), Duration::from_secs(5));
    std::env::remove_var("CI_IPC_TIMEOUT_MS");
}
