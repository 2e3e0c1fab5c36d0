//! The transport boundary: anything that can carry a [`Request`] to the
//! remote side and eventually complete the returned handle exactly once.

use crate::{
    dispatcher::Dispatcher,
    handle::{AsyncCallHandle, CallFailed, CallHandle, RemoteFailure},
    net::Request,
};
use std::sync::Arc;

/// Dispatches requests to a remote endpoint. Each dispatched request must
/// terminate in exactly one delivery: a result, a decoded remote failure,
/// or a transport failure.
pub trait Transport: Send + Sync {
    /// Must be called from within a tokio runtime; the reply is delivered
    /// from a spawned task.
    fn dispatch(&self, request: Request) -> CallHandle;

    /// Typed capability query. Transports without the async capability keep
    /// the default.
    fn as_async(&self) -> Option<&dyn AsyncTransport> {
        None
    }
}

/// Capability extension: dispatch yielding a callback-capable handle.
pub trait AsyncTransport: Transport {
    fn dispatch_async(&self, request: Request) -> AsyncCallHandle;
}

/// In-process transport running calls straight through a [`Dispatcher`].
/// The delivery path still runs on its own task, so handle completion races
/// behave as they do over a real wire.
pub struct LocalTransport {
    dispatcher: Arc<Dispatcher>,
}

impl LocalTransport {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

impl Transport for LocalTransport {
    fn dispatch(&self, request: Request) -> CallHandle {
        let handle = CallHandle::new();
        let completer = handle.clone();
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move {
            let outcome = dispatcher
                .call(request)
                .await
                .map_err(|e| CallFailed::Remote(RemoteFailure::Dispatch(e)));
            completer.complete(outcome);
        });
        handle
    }

    fn as_async(&self) -> Option<&dyn AsyncTransport> {
        Some(self)
    }
}

impl AsyncTransport for LocalTransport {
    fn dispatch_async(&self, request: Request) -> AsyncCallHandle {
        AsyncCallHandle::from(self.dispatch(request))
    }
}
