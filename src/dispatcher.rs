//! Server-side dispatch: maps method names to registered [`RpcFunction`]s
//! and runs a decoded call against them.

use crate::{
    net::Request,
    types::{Decode, Encode, Signature, TypeMismatch, Typed, Value},
    RpcFunction,
};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error;

/// A set of [`RpcFunction`]s callable by name with [`Value`] arguments.
#[derive(Default)]
pub struct Dispatcher {
    rpc_functions: BTreeMap<String, Arc<dyn DynamicRpcFunction + Send + Sync>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<RFn>(&mut self, rpc_function: RFn)
    where
        RFn: RpcFunction + Send + Sync + 'static,
        RFn::Domain: Typed + Send,
        RFn::Range: Typed,
        RFn::RangeFut: Send,
    {
        let signature = Signature::of::<RFn>();
        let name = rpc_function.name().to_owned();
        let dyn_rfn = Arc::new(TypedRpcFunction {
            rpc_function,
            signature,
        });
        self.rpc_functions.insert(name, dyn_rfn);
    }

    pub async fn call(&self, request: Request) -> CallResult {
        let Request { method, args } = request;
        let rfn = self
            .rpc_functions
            .get(&method)
            .ok_or(DispatchError::NoSuchFunction(method))?;
        let [arg] = <[Value; 1]>::try_from(args).map_err(|args| DispatchError::Arity {
            expected: 1,
            got: args.len(),
        })?;
        rfn.call(arg).await
    }
}

pub type CallResult = Result<Value, DispatchError>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Error)]
pub enum DispatchError {
    #[error("no function named {0:?}")]
    NoSuchFunction(String),

    #[error("expected {expected} argument(s), got {got}")]
    Arity { expected: usize, got: usize },

    #[error("argument type mismatch: {0}")]
    Domain(#[from] TypeMismatch),
}

struct TypedRpcFunction<RFn>
where
    RFn: RpcFunction + Send + Sync,
    RFn::Domain: Send,
{
    rpc_function: RFn,
    signature: Signature,
}

impl<RFn> TypedRpcFunction<RFn>
where
    RFn: RpcFunction + Send + Sync,
    RFn::Domain: Send,
{
    async fn call(&self, arg: Value) -> CallResult {
        let decoded_arg =
            RFn::Domain::decode(&self.signature.domain, arg).map_err(DispatchError::Domain)?;
        let retval = self.rpc_function.call(decoded_arg).await;
        Ok(RFn::Range::encode(retval))
    }
}

/// A type-erased version of the main trait, RpcFunction
trait DynamicRpcFunction {
    fn call(&self, arg: Value) -> BoxFuture<'_, CallResult>;
}

impl<RFn> DynamicRpcFunction for TypedRpcFunction<RFn>
where
    RFn: RpcFunction + Send + Sync,
    RFn::Domain: Send,
    RFn::RangeFut: Send,
{
    fn call(&self, arg: Value) -> BoxFuture<'_, CallResult> {
        Box::pin(self.call(arg))
    }
}
