use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::RpcFunction;

/// The wire-level type of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum Type {
    Nil,
    String,
    Int,
    Message,
}

impl Type {
    fn name(&self) -> &'static str {
        use Type::*;
        match self {
            Nil => "Nil",
            String => "String",
            Int => "Int",
            Message => "Message",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An opaque argument or result value carried by a remote call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum Value {
    Nil,
    String(String),
    Int(i64),
    Message(HelloMessage),
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<HelloMessage> for Value {
    fn from(m: HelloMessage) -> Self {
        Value::Message(m)
    }
}

/// Value object passed to `hello_message`: who is calling and what they said.
/// Immutable once built; travels by value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HelloMessage {
    pub from: String,
    pub body: String,
}

impl HelloMessage {
    pub fn new(from: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            body: body.into(),
        }
    }
}

/// Domain and range types of a remotely callable function.
#[derive(Debug, Clone)]
pub struct Signature {
    pub domain: Type,
    pub range: Type,
}

impl Signature {
    pub fn of<RFn>() -> Self
    where
        RFn: RpcFunction,
        RFn::Domain: Typed,
        RFn::Range: Typed,
    {
        Signature {
            domain: RFn::Domain::rpc_type(),
            range: RFn::Range::rpc_type(),
        }
    }
}

pub trait Typed {
    fn rpc_type() -> Type;
}

pub trait Encode {
    fn encode(val: Self) -> Value;
}

pub trait Decode: Sized {
    fn decode(typ: &Type, val: Value) -> Result<Self, TypeMismatch>;
}

macro_rules! impl_encode_decode {
    ($rust_type:ty, $rpc_type:expr, $encode_name:pat => $encode_expr:expr, $($from_rpc_arm:tt)*) => {
        impl Typed for $rust_type {
            fn rpc_type() -> Type {
                $rpc_type
            }
        }

        impl Encode for $rust_type {
            fn encode($encode_name: $rust_type) -> Value {
                $encode_expr
            }
        }

        impl Decode for $rust_type {
            fn decode(_typ: &Type, val: Value) -> Result<Self, TypeMismatch> {
                Ok(match val {
                    $($from_rpc_arm)*,
                    _ => return Err(TypeMismatch::new(val, <Self as Typed>::rpc_type()))
                })
            }
        }
    };
}

impl_encode_decode!((), Type::Nil, () => Value::Nil, Value::Nil => ());
impl_encode_decode!(String, Type::String, s => Value::String(s), Value::String(s) => s);
impl_encode_decode!(i64, Type::Int, n => Value::Int(n), Value::Int(n) => n);
impl_encode_decode!(HelloMessage, Type::Message, m => Value::Message(m), Value::Message(m) => m);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Error)]
#[error("type error: {value:?} :/: {expected_type}")]
pub struct TypeMismatch {
    value: Value,
    expected_type: Type,
}

impl TypeMismatch {
    fn new(value: Value, expected_type: Type) -> Self {
        Self {
            value,
            expected_type,
        }
    }
}
