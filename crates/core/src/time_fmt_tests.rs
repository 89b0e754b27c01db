// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    zero    = { 0,       "0s" },
    seconds = { 59,      "59s" },
    minutes = { 125,     "2m" },
    hours   = { 7_200,   "2h" },
    days    = { 259_200, "3d" },
)]
fn elapsed(secs: u64, expected: &str) {
    assert_eq!(format_elapsed(secs), expected);
}

#[yare::parameterized(
    millis  = { 850,        "850ms" },
    seconds = { 12_400,     "12s" },
    minutes = { 200_000,    "3m 20s" },
    hours   = { 7_500_000,  "2h 5m" },
)]
fn elapsed_ms(ms: u64, expected: &str) {
    assert_eq!(format_elapsed_ms(ms), expected);
}
