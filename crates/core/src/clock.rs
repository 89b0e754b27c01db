// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock source for `started_at` / `finished_at` stamps.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current wall time in epoch milliseconds.
pub trait Clock: Clone + Send + Sync + 'static {
    fn epoch_ms(&self) -> u64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis() as u64)
    }
}

#[derive(Debug)]
struct FakeTime {
    now_ms: u64,
    step_ms: u64,
}

/// Manually driven clock. Clones share one timeline.
///
/// With a nonzero [`FakeClock::tick`] step, each read returns the current
/// time and then moves it forward, so two stamps never compare equal.
#[derive(Clone, Debug)]
pub struct FakeClock {
    time: Arc<Mutex<FakeTime>>,
}

impl FakeClock {
    pub fn new() -> Self {
        let time = FakeTime { now_ms: 1_000_000, step_ms: 0 };
        Self { time: Arc::new(Mutex::new(time)) }
    }

    pub fn advance(&self, by: Duration) {
        self.time.lock().now_ms += by.as_millis() as u64;
    }

    pub fn set_epoch_ms(&self, ms: u64) {
        self.time.lock().now_ms = ms;
    }

    /// Move forward `ms` after every read.
    pub fn tick(&self, ms: u64) {
        self.time.lock().step_ms = ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> u64 {
        let mut time = self.time.lock();
        let read = time.now_ms;
        time.now_ms += time.step_ms;
        read
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
