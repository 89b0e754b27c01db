// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

const QUIET: Duration = Duration::from_secs(10);

fn counting() -> (Debouncer, Arc<AtomicUsize>, CancellationToken) {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let cancel = CancellationToken::new();
    let debouncer = Debouncer::spawn(QUIET, cancel.clone(), move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (debouncer, fired, cancel)
}

/// Let the timer task observe time changes.
async fn settle() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn fires_once_after_quiet_period() {
    let (debouncer, fired, _cancel) = counting();
    debouncer.trigger();
    settle().await;

    tokio::time::advance(QUIET - Duration::from_millis(1)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(debouncer.is_armed());

    tokio::time::advance(Duration::from_millis(2)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!debouncer.is_armed());
}

#[tokio::test(start_paused = true)]
async fn burst_of_triggers_collapses_into_one_run() {
    let (debouncer, fired, _cancel) = counting();

    for _ in 0..5 {
        debouncer.trigger();
        settle().await;
        tokio::time::advance(Duration::from_secs(3)).await;
        settle().await;
    }
    // Last trigger was 3s ago: nothing yet.
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    tokio::time::advance(Duration::from_secs(7)).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    tokio::time::advance(QUIET * 3).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn separated_triggers_fire_separately() {
    let (debouncer, fired, _cancel) = counting();

    debouncer.trigger();
    settle().await;
    tokio::time::advance(QUIET + Duration::from_secs(1)).await;
    settle().await;

    debouncer.trigger();
    settle().await;
    tokio::time::advance(QUIET + Duration::from_secs(1)).await;
    settle().await;

    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn cancelled_timer_never_fires() {
    let (debouncer, fired, cancel) = counting();
    debouncer.trigger();
    settle().await;

    cancel.cancel();
    settle().await;
    tokio::time::advance(QUIET * 2).await;
    settle().await;

    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_debouncer_stops_the_task() {
    let (debouncer, fired, cancel) = counting();
    debouncer.trigger();
    drop(debouncer);

    assert!(cancel.is_cancelled());
    tokio::time::advance(QUIET * 2).await;
    settle().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
