//! Wire frames exchanged between consumer and host, bincode-encoded over TCP.

pub mod client;
pub mod server;

use crate::{dispatcher::DispatchError, types::Value};
use serde::{Deserialize, Serialize};

/// A single remote invocation: method name plus ordered arguments.
/// Immutable once built.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Request {
    pub method: String,
    pub args: Vec<Value>,
}

impl Request {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub(crate) enum Frame {
    Ping,
    Call(Request),
}

#[derive(Serialize, Deserialize, Debug)]
pub(crate) enum Reply {
    Pong,
    Call(Result<Value, DispatchError>),
}
