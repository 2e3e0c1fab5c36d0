//! A minimal remote "hello" service and the client machinery to invoke it
//! four ways: synchronously, by polling a future-style handle, by callback,
//! and by waiting on an async-capability handle.
//!
//! The interesting piece is [`handle::CallHandle`]: a single in-flight
//! invocation with single-shot completion, cancellation, and ordered
//! callback delivery. Everything else is a thin typed layer over a
//! bincode-framed TCP transport.

pub mod client;
pub mod dispatcher;
pub mod handle;
pub mod net;
pub mod service;
pub mod transport;
pub mod types;

use std::future::Future;
use types::{Decode, Encode};

pub use handle::{AsyncCallHandle, CallHandle};
pub use net::Request;

/// A remotely callable function: a name plus a typed unary signature.
pub trait RpcFunction {
    type Domain: Decode;
    type Range: Encode;
    type RangeFut: Future<Output = Self::Range>;

    fn name(&self) -> &str;
    fn call(&self, args: Self::Domain) -> Self::RangeFut;
}
