//! Integration tests for core-async on the Tokio runtime.

use core_async::{sync, task, time};

#[tokio::test]
async fn test_task_spawn() {
    let handle = task::spawn(async { 42 });
    let result = handle.await.unwrap();
    assert_eq!(result, 42);
}

#[tokio::test]
async fn test_timeout_failure() {
    let result = time::timeout(time::Duration::from_millis(10), async {
        time::sleep(time::Duration::from_millis(100)).await;
        42
    })
    .await;

    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_ticker_rate() {
    let mut ticks = time::ticker(time::Duration::from_millis(200));
    let start = tokio::time::Instant::now();

    for _ in 0..5 {
        ticks.tick().await;
    }

    // First tick is immediate, the remaining four are 200ms apart.
    let elapsed = start.elapsed();
    assert!(elapsed >= time::Duration::from_millis(800));
    assert!(elapsed < time::Duration::from_millis(1000));
}

#[tokio::test]
async fn test_cancellation_token_wakes_waiters() {
    let token = sync::CancellationToken::new();
    let child = token.child_token();

    let handle = task::spawn(async move {
        child.cancelled().await;
        "cancelled"
    });

    token.cancel();
    assert_eq!(handle.await.unwrap(), "cancelled");
}

#[tokio::test]
async fn test_unbounded_channel_from_foreign_thread() {
    let (tx, mut rx) = sync::mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for i in 0..3 {
            tx.send(i).unwrap();
        }
    });

    let mut received = Vec::new();
    while let Some(value) = rx.recv().await {
        received.push(value);
    }
    assert_eq!(received, vec![0, 1, 2]);
}

#[test]
fn test_current_handle_outside_runtime() {
    assert!(core_async::runtime::current_handle().is_none());
}
