//! Consumer side: a typed proxy over a [`Transport`] and a client driving
//! the four invocation styles against it.

use crate::{
    handle::{AsyncCallHandle, CallFailed, CallHandle, RemoteFailure, WaitError},
    net::Request,
    service::{HELLO_MESSAGE_METHOD, HELLO_METHOD},
    transport::{AsyncTransport, Transport},
    types::{Decode, HelloMessage, Type, TypeMismatch, Value},
};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, warn};

/// Backoff between `is_done` polls, and pacing between invocation styles.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Local stand-in for the remote hello service.
pub struct HelloProxy {
    transport: Arc<dyn Transport>,
}

impl HelloProxy {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn hello(&self, message: &str) -> CallHandle {
        self.transport
            .dispatch(Request::new(HELLO_METHOD, vec![Value::from(message)]))
    }

    pub fn hello_message(&self, message: HelloMessage) -> CallHandle {
        self.transport
            .dispatch(Request::new(HELLO_MESSAGE_METHOD, vec![Value::from(message)]))
    }

    /// Typed capability query; `None` when the transport cannot produce
    /// callback-capable handles.
    pub fn as_async(&self) -> Option<AsyncHelloProxy<'_>> {
        self.transport.as_async().map(AsyncHelloProxy)
    }
}

/// Capability-extended view of a [`HelloProxy`].
pub struct AsyncHelloProxy<'a>(&'a dyn AsyncTransport);

impl AsyncHelloProxy<'_> {
    pub fn hello(&self, message: &str) -> AsyncCallHandle {
        self.0
            .dispatch_async(Request::new(HELLO_METHOD, vec![Value::from(message)]))
    }

    pub fn hello_message(&self, message: HelloMessage) -> AsyncCallHandle {
        self.0
            .dispatch_async(Request::new(HELLO_MESSAGE_METHOD, vec![Value::from(message)]))
    }
}

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("remote call failed: {0}")]
    Remote(#[from] RemoteFailure),

    #[error("remote call cancelled before completion")]
    Cancelled,

    #[error("no remote response within {0:?}")]
    Timeout(Duration),

    #[error("proxy does not provide the async capability")]
    CapabilityMissing,

    #[error("unexpected reply payload: {0}")]
    BadReply(#[from] TypeMismatch),
}

impl From<WaitError> for InvokeError {
    fn from(e: WaitError) -> Self {
        match e {
            WaitError::Failed(CallFailed::Remote(failure)) => InvokeError::Remote(failure),
            WaitError::Failed(CallFailed::Cancelled) => InvokeError::Cancelled,
            WaitError::Timeout(bound) => InvokeError::Timeout(bound),
        }
    }
}

/// Drives the four invocation styles against an injected proxy.
pub struct HelloClient {
    proxy: HelloProxy,
}

impl HelloClient {
    pub fn new(proxy: HelloProxy) -> Self {
        Self { proxy }
    }

    /// Blocks the caller until the reply arrives; remote failures propagate
    /// unmodified.
    pub async fn invoke_sync(&self, text: &str) -> Result<String, InvokeError> {
        let handle = self.proxy.hello(text);
        let value = handle.wait(None).await?;
        expect_string(value)
    }

    /// Polls the handle with a fixed backoff, doing other work between
    /// polls, then collects the result.
    pub async fn invoke_via_future(&self, text: &str) -> Result<String, InvokeError> {
        let handle = self.proxy.hello(text);
        while !handle.is_done() {
            info!("waiting for remote response via future");
            sleep(POLL_INTERVAL).await;
        }
        let value = handle.wait(None).await?;
        expect_string(value)
    }

    /// Registers a two-branch callback and returns immediately without
    /// blocking. The returned handle lets the caller observe or cancel the
    /// call later.
    pub fn invoke_via_callback(&self, text: &str) -> Result<AsyncCallHandle, InvokeError> {
        let async_proxy = self.proxy.as_async().ok_or(InvokeError::CapabilityMissing)?;
        let handle = async_proxy.hello(text);
        handle.on_complete(|outcome| match outcome {
            Ok(value) => info!("received remote response via callback: {value:?}"),
            Err(failure) => warn!("remote call via callback failed: {failure}"),
        });
        Ok(handle)
    }

    /// Like [`invoke_via_future`](Self::invoke_via_future) but on the async
    /// capability's handle; cancellation surfaces as its own failure kind,
    /// distinct from a timeout.
    pub async fn invoke_via_async_future(&self, text: &str) -> Result<String, InvokeError> {
        let async_proxy = self.proxy.as_async().ok_or(InvokeError::CapabilityMissing)?;
        let handle = async_proxy.hello(text);
        while !handle.is_done() {
            info!("waiting for remote response via async future");
            sleep(POLL_INTERVAL).await;
        }
        let value = handle.wait(None).await?;
        expect_string(value)
    }

    /// Exercises all four styles sequentially with fixed pacing, reporting
    /// entry, outcome, and exit per style. A proxy without the async
    /// capability skips the last two styles without failing.
    pub async fn run_all(&self, caller: &str) {
        info!("entering synchronous remote call via proxy");
        match self
            .invoke_sync(&format!("{caller} using a synchronous remote call via proxy"))
            .await
        {
            Ok(ack) => info!("received remote response via proxy: {ack}"),
            Err(e) => warn!("synchronous remote call failed: {e}"),
        }
        info!("exiting synchronous remote call via proxy");
        sleep(POLL_INTERVAL).await;

        info!("entering remote call via future");
        match self
            .invoke_via_future(&format!("{caller} using a remote call via future"))
            .await
        {
            Ok(ack) => info!("received remote response via future: {ack}"),
            Err(e) => warn!("remote call via future failed: {e}"),
        }
        info!("exiting remote call via future");
        sleep(POLL_INTERVAL).await;

        info!("entering remote call via callback");
        match self.invoke_via_callback(&format!("{caller} using a remote call via callback")) {
            Ok(_handle) => info!("callback registered; continuing without blocking"),
            Err(InvokeError::CapabilityMissing) => {
                warn!("remote call via callback not executed: async capability missing");
            }
            Err(e) => warn!("remote call via callback failed: {e}"),
        }
        info!("exiting remote call via callback");
        sleep(POLL_INTERVAL).await;

        info!("entering remote call via async future");
        match self
            .invoke_via_async_future(&format!("{caller} using a remote call via async future"))
            .await
        {
            Ok(ack) => info!("received remote response via async future: {ack}"),
            Err(InvokeError::CapabilityMissing) => {
                warn!("remote call via async future not executed: async capability missing");
            }
            Err(InvokeError::Cancelled) => {
                warn!("remote call via async future was cancelled");
            }
            Err(e) => warn!("remote call via async future failed: {e}"),
        }
        info!("exiting remote call via async future");
    }
}

fn expect_string(value: Value) -> Result<String, InvokeError> {
    Ok(String::decode(&Type::String, value)?)
}
