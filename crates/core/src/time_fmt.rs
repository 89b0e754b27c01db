// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compact human-readable durations for CLI output.

/// Format elapsed seconds as a coarse relative duration ("5s", "2m", "1h", "3d").
pub fn format_elapsed(secs: u64) -> String {
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 3_600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3_600),
        s => format!("{}d", s / 86_400),
    }
}

/// Format a duration in milliseconds with one extra unit of precision
/// ("850ms", "12s", "3m 20s", "2h 5m").
pub fn format_elapsed_ms(ms: u64) -> String {
    let secs = ms / 1_000;
    match secs {
        0 => format!("{ms}ms"),
        s if s < 60 => format!("{s}s"),
        s if s < 3_600 => format!("{}m {}s", s / 60, s % 60),
        s => format!("{}h {}m", s / 3_600, (s % 3_600) / 60),
    }
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
