//! Contract tests for the invocation handle: single-shot completion,
//! ordered callbacks, cancellation races.

use hello_remote::handle::{AsyncCallHandle, CallFailed, CallHandle, RemoteFailure, WaitError};
use hello_remote::types::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task;

#[tokio::test]
async fn done_flag_is_permanent() {
    let handle = CallHandle::new();
    assert!(!handle.is_done());

    assert!(handle.complete(Ok(Value::from("pong"))));
    assert!(handle.is_done());

    // Second delivery is dropped, done stays set.
    assert!(!handle.complete(Ok(Value::from("again"))));
    assert!(handle.is_done());
}

#[tokio::test]
async fn wait_returns_delivered_result() {
    let handle = CallHandle::new();
    let completer = handle.clone();
    task::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        completer.complete(Ok(Value::from("pong")));
    });

    let value = handle.wait(None).await.unwrap();
    assert_eq!(value, Value::from("pong"));
}

#[tokio::test]
async fn wait_reports_remote_failure() {
    let handle = CallHandle::new();
    handle.complete(Err(CallFailed::Remote(RemoteFailure::Transport(
        "boom".to_owned(),
    ))));

    match handle.wait(None).await {
        Err(WaitError::Failed(CallFailed::Remote(RemoteFailure::Transport(msg)))) => {
            assert_eq!(msg, "boom");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn wait_times_out() {
    let handle = CallHandle::new();
    match handle.wait(Some(Duration::from_millis(10))).await {
        Err(WaitError::Timeout(bound)) => assert_eq!(bound, Duration::from_millis(10)),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn callbacks_fire_in_registration_order_exactly_once() {
    let handle = CallHandle::new();
    let async_handle = AsyncCallHandle::from(handle.clone());

    let fired = Arc::new(Mutex::new(Vec::new()));
    for i in 0..4 {
        let fired = fired.clone();
        async_handle.on_complete(move |_| fired.lock().unwrap().push(i));
    }

    handle.complete(Ok(Value::Nil));
    assert_eq!(*fired.lock().unwrap(), vec![0, 1, 2, 3]);

    // Registration after completion fires immediately on this thread.
    let late = fired.clone();
    async_handle.on_complete(move |_| late.lock().unwrap().push(99));
    assert_eq!(*fired.lock().unwrap(), vec![0, 1, 2, 3, 99]);
}

#[tokio::test]
async fn cancel_after_complete_is_noop() {
    let handle = CallHandle::new();
    assert!(handle.complete(Ok(Value::from(1))));
    assert!(!handle.cancel());
    assert_eq!(handle.wait(None).await.unwrap(), Value::from(1));
}

#[tokio::test]
async fn cancelled_callback_never_sees_late_delivery() {
    let handle = CallHandle::new();
    let async_handle = AsyncCallHandle::from(handle.clone());

    let outcomes = Arc::new(Mutex::new(Vec::new()));
    let sink = outcomes.clone();
    async_handle.on_complete(move |outcome| sink.lock().unwrap().push(outcome));

    assert!(async_handle.cancel());
    // The response loses the race; no success callback may fire.
    assert!(!handle.complete(Ok(Value::from("late"))));

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0], Err(CallFailed::Cancelled)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancel_racing_delivery_yields_one_terminal_state() {
    for _ in 0..200 {
        let handle = CallHandle::new();
        let deliver = {
            let h = handle.clone();
            task::spawn(async move { h.complete(Ok(Value::from("pong"))) })
        };
        let cancel = {
            let h = handle.clone();
            task::spawn(async move { h.cancel() })
        };
        let delivered = deliver.await.unwrap();
        let cancelled = cancel.await.unwrap();
        assert!(delivered ^ cancelled, "exactly one writer must win");

        match handle.wait(None).await {
            Ok(value) => {
                assert!(delivered);
                assert_eq!(value, Value::from("pong"));
            }
            Err(WaitError::Failed(CallFailed::Cancelled)) => assert!(cancelled),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
