//! The hello service itself: two stateless functions returning
//! acknowledgement strings. Safe for concurrent invocation.

use crate::{types::HelloMessage, RpcFunction};
use futures::future::{ready, Ready};
use tracing::info;

pub const HELLO_METHOD: &str = "hello";
pub const HELLO_MESSAGE_METHOD: &str = "hello_message";

/// `hello(message) -> string`
pub struct Hello;

impl RpcFunction for Hello {
    type Domain = String;
    type Range = String;
    type RangeFut = Ready<String>;

    fn name(&self) -> &str {
        HELLO_METHOD
    }

    fn call(&self, message: String) -> Self::RangeFut {
        info!("received hello from caller {message}");
        ready(format!("Acknowledgement from service host - {message}"))
    }
}

/// `hello_message(msg) -> string`, acknowledging the sender.
pub struct HelloWithMessage;

impl RpcFunction for HelloWithMessage {
    type Domain = HelloMessage;
    type Range = String;
    type RangeFut = Ready<String>;

    fn name(&self) -> &str {
        HELLO_MESSAGE_METHOD
    }

    fn call(&self, message: HelloMessage) -> Self::RangeFut {
        info!("received hello message {:?} from {}", message.body, message.from);
        ready(format!(
            "Acknowledgement from service host - {}",
            message.from
        ))
    }
}
