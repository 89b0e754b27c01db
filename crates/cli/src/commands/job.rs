// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ci add`, `ci remove` and `ci heartbeat`

use anyhow::Result;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

pub async fn add(name: &str, remote: &str, branch: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect_or_start().await.map_err(ExitError::from)?;
    client.add_job(name, remote, branch).await.map_err(ExitError::from)?;

    let obj = serde_json::json!({ "added": { "name": name, "remote": remote, "branch": branch } });
    format_or_json(format, &obj, || println!("added {} {} {}", name, remote, branch))
}

pub async fn remove(name: &str, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(ExitError::from)?;
    client.remove_job(name).await.map_err(ExitError::from)?;

    let obj = serde_json::json!({ "removed": name });
    format_or_json(format, &obj, || println!("removed {}", name))
}

pub async fn heartbeat(format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect_or_start().await.map_err(ExitError::from)?;
    client.heartbeat().await.map_err(ExitError::from)?;

    let obj = serde_json::json!({ "heartbeat": true });
    format_or_json(format, &obj, || println!("heartbeat sent"))
}
