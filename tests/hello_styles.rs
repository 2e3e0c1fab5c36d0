//! End-to-end coverage of the four invocation styles, over TCP and over the
//! in-process transport.

use hello_remote::{
    client::{HelloClient, HelloProxy, InvokeError},
    dispatcher::{DispatchError, Dispatcher},
    handle::{CallFailed, CallHandle, RemoteFailure, WaitError},
    net::{client::TcpTransport, server::Server},
    service::{Hello, HelloWithMessage},
    transport::{LocalTransport, Transport},
    types::{HelloMessage, Value},
    Request,
};
use std::{sync::Arc, time::Duration};
use tokio::task;

fn hello_dispatcher() -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    dispatcher.add(Hello);
    dispatcher.add(HelloWithMessage);
    dispatcher
}

async fn spawn_host(port: u16) -> TcpTransport {
    let mut server = Server::new();
    server.add(Hello);
    server.add(HelloWithMessage);
    task::spawn(server.serve_tcp(port));

    let transport = TcpTransport::new(([127, 0, 0, 1], port).into());
    for _ in 0..50 {
        if transport.ping().await.is_ok() {
            return transport;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("hello host did not come up on port {port}");
}

#[tokio::test]
async fn four_styles_against_tcp_host() {
    let transport = spawn_host(9381).await;
    let client = HelloClient::new(HelloProxy::new(Arc::new(transport)));

    let ack = client.invoke_sync("sync caller").await.unwrap();
    assert_eq!(ack, "Acknowledgement from service host - sync caller");

    let ack = client.invoke_via_future("future caller").await.unwrap();
    assert_eq!(ack, "Acknowledgement from service host - future caller");

    let handle = client.invoke_via_callback("callback caller").unwrap();
    let value = handle.wait(Some(Duration::from_secs(2))).await.unwrap();
    assert_eq!(
        value,
        Value::from("Acknowledgement from service host - callback caller")
    );

    let ack = client.invoke_via_async_future("async caller").await.unwrap();
    assert_eq!(ack, "Acknowledgement from service host - async caller");
}

#[tokio::test]
async fn hello_message_acknowledges_the_sender() {
    let transport = LocalTransport::new(hello_dispatcher());
    let proxy = HelloProxy::new(Arc::new(transport));

    let handle = proxy.hello_message(HelloMessage::new("alice", "hi there"));
    let value = handle.wait(Some(Duration::from_secs(2))).await.unwrap();
    assert_eq!(value, Value::from("Acknowledgement from service host - alice"));
}

#[tokio::test]
async fn unknown_method_is_a_dispatch_failure() {
    let transport = LocalTransport::new(hello_dispatcher());
    let handle = transport.dispatch(Request::new("goodbye", vec![Value::Nil]));

    match handle.wait(Some(Duration::from_secs(2))).await {
        Err(WaitError::Failed(CallFailed::Remote(RemoteFailure::Dispatch(
            DispatchError::NoSuchFunction(name),
        )))) => assert_eq!(name, "goodbye"),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn wrong_argument_type_is_rejected() {
    let transport = LocalTransport::new(hello_dispatcher());
    let handle = transport.dispatch(Request::new("hello", vec![Value::from(7)]));

    match handle.wait(Some(Duration::from_secs(2))).await {
        Err(WaitError::Failed(CallFailed::Remote(RemoteFailure::Dispatch(
            DispatchError::Domain(_),
        )))) => {}
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn wrong_arity_is_rejected() {
    let transport = LocalTransport::new(hello_dispatcher());
    let handle = transport.dispatch(Request::new("hello", vec![]));

    match handle.wait(Some(Duration::from_secs(2))).await {
        Err(WaitError::Failed(CallFailed::Remote(RemoteFailure::Dispatch(
            DispatchError::Arity { expected: 1, got: 0 },
        )))) => {}
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_yields_transport_failure() {
    let transport = TcpTransport::new(([127, 0, 0, 1], 9399).into());
    let handle = transport.dispatch(Request::new("hello", vec![Value::from("x")]));

    match handle.wait(Some(Duration::from_secs(2))).await {
        Err(WaitError::Failed(CallFailed::Remote(RemoteFailure::Transport(_)))) => {}
        other => panic!("unexpected outcome: {other:?}"),
    }
}

/// A transport that deliberately withholds the async capability.
struct SyncOnly(LocalTransport);

impl Transport for SyncOnly {
    fn dispatch(&self, request: Request) -> CallHandle {
        self.0.dispatch(request)
    }
}

#[tokio::test]
async fn callback_style_without_async_capability_is_skipped() {
    let transport = SyncOnly(LocalTransport::new(hello_dispatcher()));
    let client = HelloClient::new(HelloProxy::new(Arc::new(transport)));

    match client.invoke_via_callback("caller") {
        Ok(_) => panic!("expected the capability query to fail"),
        Err(e) => assert!(matches!(e, InvokeError::CapabilityMissing)),
    }

    // The plain styles still work over the same proxy.
    let ack = client.invoke_sync("caller").await.unwrap();
    assert_eq!(ack, "Acknowledgement from service host - caller");
}
