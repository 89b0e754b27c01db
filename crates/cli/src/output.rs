// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text/JSON output selection shared by every command.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Wall-clock epoch milliseconds, zero if the clock predates the epoch.
pub fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis() as u64)
}

/// Four-space indent for captured phase output shown under a header.
pub fn indent(text: &str) -> String {
    text.lines().map(|line| format!("    {line}\n")).collect()
}

/// Pretty JSON on stdout in JSON mode, otherwise run `text`.
pub fn format_or_json<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
    text: impl FnOnce(),
) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(data)?;
        println!("{json}");
    } else {
        text();
    }
    Ok(())
}

/// Like [`format_or_json`] for collections: an empty list prints `empty`
/// in text mode instead of calling `render`.
pub fn handle_list<T: Serialize>(
    format: OutputFormat,
    items: &[T],
    empty: &str,
    render: impl FnOnce(&[T], &mut dyn Write),
) -> anyhow::Result<()> {
    format_or_json(format, items, || match items {
        [] => println!("{empty}"),
        _ => render(items, &mut std::io::stdout().lock()),
    })
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
