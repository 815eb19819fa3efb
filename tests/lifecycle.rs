//! Lifecycle: idempotent start, total teardown, post-shutdown rejection.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use futures::future::pending;
use taskline::prelude::*;
use tokio::sync::oneshot;
use tokio::time::timeout;

#[tokio::test]
async fn shutdown_cancels_every_pending_item() {
    let executor = SequentialExecutor::<u32>::new();
    let results = Arc::new(Mutex::new(Vec::new()));
    let (entered_tx, entered_rx) = oneshot::channel();

    let mut handles = Vec::new();
    // The worker parks inside the first item; the other two stay queued.
    {
        let results = Arc::clone(&results);
        handles.push(
            executor
                .register(
                    move |_| async move {
                        let _ = entered_tx.send(());
                        pending::<()>().await;
                        results.lock().unwrap().push(1);
                        Ok(1)
                    },
                    None,
                )
                .unwrap(),
        );
    }
    for n in [2u32, 3] {
        let results = Arc::clone(&results);
        handles.push(
            executor
                .register(
                    move |_| async move {
                        results.lock().unwrap().push(n);
                        Ok(n)
                    },
                    None,
                )
                .unwrap(),
        );
    }

    executor.execute().unwrap();
    timeout(Duration::from_secs(5), entered_rx)
        .await
        .unwrap()
        .unwrap();
    executor.shutdown();

    for handle in handles {
        match timeout(Duration::from_secs(5), handle).await.unwrap() {
            Err(TaskError::Cancelled(CancelSource::Executor)) => {}
            other => panic!("expected executor cancellation, got {other:?}"),
        }
    }
    assert!(results.lock().unwrap().is_empty());
}

#[tokio::test]
async fn execute_twice_starts_one_worker() {
    let executor = SequentialExecutor::<u32>::new();
    executor.execute().unwrap();
    executor.execute().unwrap();

    let (entered_tx, entered_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel::<()>();

    let first = executor
        .register(
            move |_| async move {
                let _ = entered_tx.send(());
                let _ = release_rx.await;
                Ok(1)
            },
            None,
        )
        .unwrap();
    let mut second = executor.register(|_| async { Ok(2) }, None).unwrap();

    timeout(Duration::from_secs(5), entered_rx)
        .await
        .unwrap()
        .unwrap();
    // A second worker loop would have dequeued and finished item 2 by now;
    // with exactly one loop it stays queued behind the parked first item.
    assert!(
        timeout(Duration::from_millis(100), &mut second)
            .await
            .is_err()
    );

    release_tx.send(()).unwrap();
    assert_eq!(
        timeout(Duration::from_secs(5), first)
            .await
            .unwrap()
            .unwrap(),
        1
    );
    assert_eq!(
        timeout(Duration::from_secs(5), second)
            .await
            .unwrap()
            .unwrap(),
        2
    );
}

#[tokio::test]
async fn shutdown_twice_is_one_teardown() {
    let executor = SequentialExecutor::<u32>::new();
    executor.execute().unwrap();
    executor.shutdown();
    executor.shutdown();

    assert!(matches!(executor.execute(), Err(ExecutorError::Shutdown)));
}

#[tokio::test]
async fn register_and_execute_fail_after_shutdown() {
    let executor = SequentialExecutor::<u32>::new();
    executor.execute().unwrap();
    executor.shutdown();

    assert!(matches!(executor.execute(), Err(ExecutorError::Shutdown)));
    assert!(matches!(
        executor.register(|_| async { Ok(1) }, None),
        Err(ExecutorError::Shutdown)
    ));
}

#[tokio::test]
async fn shutdown_before_execute_releases_buffered_items() {
    let executor = SequentialExecutor::<u32>::new();
    let handle = executor.register(|_| async { Ok(1) }, None).unwrap();

    executor.shutdown();
    match timeout(Duration::from_secs(1), handle).await.unwrap() {
        Err(TaskError::Cancelled(CancelSource::Executor)) => {}
        other => panic!("expected executor cancellation, got {other:?}"),
    }
}

#[tokio::test]
async fn dropping_the_executor_cancels_pending_handles() {
    let executor = SequentialExecutor::<u32>::new();
    let handle = executor.register(|_| async { Ok(1) }, None).unwrap();

    drop(executor);
    match timeout(Duration::from_secs(1), handle).await.unwrap() {
        Err(TaskError::Cancelled(CancelSource::Executor)) => {}
        other => panic!("expected executor cancellation, got {other:?}"),
    }
}

#[tokio::test]
async fn shutdown_cancels_the_in_flight_item() {
    let executor = SequentialExecutor::<u32>::new();
    executor.execute().unwrap();

    let (entered_tx, entered_rx) = oneshot::channel();
    let stuck = executor
        .register(
            move |_| async move {
                let _ = entered_tx.send(());
                pending::<()>().await;
                Ok(0)
            },
            None,
        )
        .unwrap();

    timeout(Duration::from_secs(5), entered_rx)
        .await
        .unwrap()
        .unwrap();
    executor.shutdown();

    match timeout(Duration::from_secs(5), stuck).await.unwrap() {
        Err(TaskError::Cancelled(CancelSource::Executor)) => {}
        other => panic!("expected executor cancellation, got {other:?}"),
    }
}
