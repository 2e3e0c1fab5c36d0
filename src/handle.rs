//! In-flight invocation handles.
//!
//! A [`CallHandle`] is created when a request is dispatched and completed
//! exactly once by the transport's delivery path. The state word transitions
//! `Pending -> Done` under a single lock acquisition; the first writer wins
//! and later completion attempts (a reply racing a local cancel, or the
//! reverse) are ignored.

use crate::dispatcher::DispatchError;
use crate::types::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;

/// What a finished call produced: the result value, or why it failed.
pub type CallOutcome = Result<Value, CallFailed>;

type Callback = Box<dyn FnOnce(CallOutcome) + Send>;

/// A single in-flight remote invocation.
///
/// Cloning yields another reference to the same invocation; the transport
/// keeps one clone to deliver the reply through [`complete`](Self::complete)
/// while the caller polls, waits, or cancels through another.
#[derive(Clone)]
pub struct CallHandle {
    inner: Arc<Inner>,
}

struct Inner {
    slot: Mutex<Slot>,
    done: Notify,
}

enum Slot {
    Pending(Vec<Callback>),
    Done(CallOutcome),
}

impl CallHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot::Pending(Vec::new())),
                done: Notify::new(),
            }),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True once the call reached a terminal state, permanently.
    pub fn is_done(&self) -> bool {
        matches!(&*self.slot(), Slot::Done(_))
    }

    /// Transport-side delivery. Returns `false` if the handle already
    /// reached a terminal state, in which case the outcome is dropped and
    /// no callback fires again.
    pub fn complete(&self, outcome: CallOutcome) -> bool {
        let callbacks = {
            let mut slot = self.slot();
            match &mut *slot {
                Slot::Done(_) => return false,
                Slot::Pending(callbacks) => {
                    let callbacks = std::mem::take(callbacks);
                    *slot = Slot::Done(outcome.clone());
                    callbacks
                }
            }
        };
        // Fire outside the lock, in registration order.
        for callback in callbacks {
            callback(outcome.clone());
        }
        self.inner.done.notify_waiters();
        true
    }

    /// Cooperative cancellation: succeeds only while still pending. A reply
    /// that already won the race makes this a no-op returning `false`.
    pub fn cancel(&self) -> bool {
        self.complete(Err(CallFailed::Cancelled))
    }

    /// Suspends the caller until the call reaches a terminal state, or until
    /// `timeout` elapses. `None` waits without bound.
    pub async fn wait(&self, timeout: Option<Duration>) -> Result<Value, WaitError> {
        let outcome = match timeout {
            None => self.outcome().await,
            Some(bound) => tokio::time::timeout(bound, self.outcome())
                .await
                .map_err(|_| WaitError::Timeout(bound))?,
        };
        Ok(outcome?)
    }

    async fn outcome(&self) -> CallOutcome {
        loop {
            let notified = self.inner.done.notified();
            tokio::pin!(notified);
            // Register before checking the slot so a completion between the
            // check and the await is not missed.
            notified.as_mut().enable();
            if let Slot::Done(outcome) = &*self.slot() {
                return outcome.clone();
            }
            notified.await;
        }
    }
}

impl Default for CallHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability-extended handle supporting callback registration, produced
/// only by transports that implement the async capability.
#[derive(Clone)]
pub struct AsyncCallHandle {
    handle: CallHandle,
}

impl From<CallHandle> for AsyncCallHandle {
    fn from(handle: CallHandle) -> Self {
        Self { handle }
    }
}

impl AsyncCallHandle {
    pub fn is_done(&self) -> bool {
        self.handle.is_done()
    }

    pub fn cancel(&self) -> bool {
        self.handle.cancel()
    }

    pub async fn wait(&self, timeout: Option<Duration>) -> Result<Value, WaitError> {
        self.handle.wait(timeout).await
    }

    /// Registers `callback` to run when the call completes. Callbacks fire
    /// exactly once, in registration order, on the completing thread. If the
    /// handle is already terminal the callback runs immediately on the
    /// registering thread; registration never suspends.
    pub fn on_complete<F>(&self, callback: F)
    where
        F: FnOnce(CallOutcome) + Send + 'static,
    {
        let outcome = {
            let mut slot = self.handle.slot();
            match &mut *slot {
                Slot::Pending(callbacks) => {
                    callbacks.push(Box::new(callback));
                    return;
                }
                Slot::Done(outcome) => outcome.clone(),
            }
        };
        callback(outcome);
    }
}

/// Why a dispatched call produced no result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallFailed {
    #[error(transparent)]
    Remote(#[from] RemoteFailure),

    #[error("call cancelled before completion")]
    Cancelled,
}

/// Error from [`CallHandle::wait`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WaitError {
    #[error(transparent)]
    Failed(#[from] CallFailed),

    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// The remote side failed to produce a result: either the dispatcher
/// rejected the call, or the transport itself broke down.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteFailure {
    #[error("remote dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("transport failure: {0}")]
    Transport(String),
}
