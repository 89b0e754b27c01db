// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job debounce timer.
//!
//! A trigger moves a single deadline `quiet` into the future. A background
//! task sleeps until the deadline and fires once it elapses without being
//! moved again. Triggers never queue runs.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

struct Shared {
    deadline: Mutex<Option<Instant>>,
    moved: Notify,
}

pub struct Debouncer {
    shared: Arc<Shared>,
    quiet: Duration,
    cancel: CancellationToken,
}

impl Debouncer {
    /// Spawn the timer task. `fire` is called on the timer task once per
    /// elapsed deadline; it must not block.
    pub fn spawn<F>(quiet: Duration, cancel: CancellationToken, fire: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let shared = Arc::new(Shared { deadline: Mutex::new(None), moved: Notify::new() });
        tokio::spawn(timer_loop(Arc::clone(&shared), cancel.clone(), fire));
        Self { shared, quiet, cancel }
    }

    /// Arm the timer, or push an armed timer back to `now + quiet`.
    pub fn trigger(&self) {
        *self.shared.deadline.lock() = Some(Instant::now() + self.quiet);
        self.shared.moved.notify_one();
    }

    /// Whether a run is scheduled and has not fired yet.
    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.shared.deadline.lock().is_some()
    }

    /// Stop the timer task. A pending deadline is dropped.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn timer_loop<F: Fn()>(shared: Arc<Shared>, cancel: CancellationToken, fire: F) {
    loop {
        let deadline = *shared.deadline.lock();
        match deadline {
            None => {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = shared.moved.notified() => {}
                }
            }
            Some(at) => {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = shared.moved.notified() => {}
                    _ = tokio::time::sleep_until(at) => {
                        let elapsed = {
                            let mut current = shared.deadline.lock();
                            if *current == Some(at) {
                                *current = None;
                                true
                            } else {
                                false
                            }
                        };
                        if elapsed {
                            fire();
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "debounce_tests.rs"]
mod tests;
