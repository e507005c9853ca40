//! Integration tests for core-async on native platforms.
//!
//! These cover the primitives the playback sampler is built from: spawned
//! tasks, intervals, cancellation tokens and `select!`.

use core_async::{runtime, sync, task, time};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[core_async::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    assert_eq!(handle.await.unwrap(), 42);
}

#[core_async::test]
async fn test_spawn_on_current_handle() {
    let handle = runtime::Handle::try_current().expect("inside runtime");
    let join = task::spawn_on(&handle, async { "spawned" });
    assert_eq!(join.await.unwrap(), "spawned");
}

#[test]
fn test_in_runtime_detection() {
    assert!(!runtime::in_runtime());
    runtime::block_on(async {
        assert!(runtime::in_runtime());
    });
}

#[core_async::test]
async fn test_abort_stops_task() {
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = counter.clone();

    let handle = task::spawn(async move {
        loop {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            time::sleep(time::Duration::from_millis(5)).await;
        }
    });

    time::sleep(time::Duration::from_millis(20)).await;
    handle.abort();
    let result = handle.await;
    assert!(result.unwrap_err().is_cancelled());

    let seen = counter.load(Ordering::SeqCst);
    time::sleep(time::Duration::from_millis(20)).await;
    assert_eq!(counter.load(Ordering::SeqCst), seen);
}

#[core_async::test]
async fn test_interval_first_tick_is_immediate() {
    let mut ticker = time::interval(time::Duration::from_millis(50));
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    let start = time::Instant::now();
    ticker.tick().await;
    assert!(start.elapsed() < time::Duration::from_millis(40));

    ticker.tick().await;
    assert!(start.elapsed() >= time::Duration::from_millis(50));
}

#[core_async::test]
async fn test_cancellation_token_wakes_select() {
    let token = sync::CancellationToken::new();
    let child = token.child_token();

    let handle = task::spawn(async move {
        let mut ticks = 0u32;
        let mut ticker = time::interval(time::Duration::from_millis(5));
        loop {
            core_async::select! {
                _ = child.cancelled() => break ticks,
                _ = ticker.tick() => ticks += 1,
            }
        }
    });

    time::sleep(time::Duration::from_millis(30)).await;
    token.cancel();
    let ticks = handle.await.unwrap();
    assert!(ticks >= 1);
}

#[core_async::test]
async fn test_timeout_success_and_failure() {
    let ok = time::timeout(time::Duration::from_millis(100), async { 7 }).await;
    assert_eq!(ok.unwrap(), 7);

    let late = time::timeout(
        time::Duration::from_millis(10),
        time::sleep(time::Duration::from_millis(100)),
    )
    .await;
    assert!(late.is_err());
}

#[core_async::test]
async fn test_broadcast_channel_fan_out() {
    let (tx, mut rx1) = sync::broadcast::channel(8);
    let mut rx2 = tx.subscribe();

    tx.send("ready").unwrap();
    tx.send("playing").unwrap();

    assert_eq!(rx1.recv().await.unwrap(), "ready");
    assert_eq!(rx1.recv().await.unwrap(), "playing");
    assert_eq!(rx2.recv().await.unwrap(), "ready");
}

#[test]
fn test_millis_helpers() {
    assert!(time::now_millis() > 0);
    assert_eq!(time::as_millis_u64(time::Duration::from_secs(3)), 3_000);
    assert_eq!(time::as_millis_u64(time::Duration::MAX), u64::MAX);
}
