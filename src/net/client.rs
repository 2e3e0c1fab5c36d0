use super::{Frame, Reply, Request};
use crate::{
    handle::{AsyncCallHandle, CallFailed, CallHandle, RemoteFailure},
    transport::{AsyncTransport, Transport},
};
use async_bincode::{tokio::AsyncBincodeStream, AsyncDestination};
use std::{io, net::SocketAddr};
use tokio::{io::BufStream, net::TcpStream};
use tracing::debug;

use futures::{SinkExt, StreamExt};

type Conn = AsyncBincodeStream<BufStream<TcpStream>, Reply, Frame, AsyncDestination>;

/// Consumer-side transport speaking bincode frames over TCP, one
/// connection per dispatched request.
pub struct TcpTransport {
    addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    async fn connect(addr: SocketAddr) -> io::Result<Conn> {
        let sock = TcpStream::connect(addr).await?;
        let sock = BufStream::new(sock);
        Ok(AsyncBincodeStream::from(sock).for_async())
    }

    async fn send_recv(addr: SocketAddr, frame: Frame) -> Result<Reply, RemoteFailure> {
        let mut sock = Self::connect(addr).await.map_err(transport_err)?;
        sock.send(frame).await.map_err(transport_err)?;
        sock.next()
            .await
            .ok_or_else(|| RemoteFailure::Transport("connection closed before reply".to_owned()))?
            .map_err(transport_err)
    }

    /// Round-trip liveness probe, used when resolving a proxy to a host.
    pub async fn ping(&self) -> Result<(), RemoteFailure> {
        match Self::send_recv(self.addr, Frame::Ping).await? {
            Reply::Pong => Ok(()),
            reply => Err(RemoteFailure::Transport(format!(
                "unexpected reply to ping: {reply:?}"
            ))),
        }
    }
}

impl Transport for TcpTransport {
    fn dispatch(&self, request: Request) -> CallHandle {
        let handle = CallHandle::new();
        let completer = handle.clone();
        let addr = self.addr;
        tokio::spawn(async move {
            let outcome = match Self::send_recv(addr, Frame::Call(request)).await {
                Ok(Reply::Call(Ok(value))) => Ok(value),
                Ok(Reply::Call(Err(e))) => Err(CallFailed::Remote(RemoteFailure::Dispatch(e))),
                Ok(reply) => Err(CallFailed::Remote(RemoteFailure::Transport(format!(
                    "unexpected reply to call: {reply:?}"
                )))),
                Err(e) => Err(CallFailed::Remote(e)),
            };
            if !completer.complete(outcome) {
                debug!("reply arrived after local terminal state; dropped");
            }
        });
        handle
    }

    fn as_async(&self) -> Option<&dyn AsyncTransport> {
        Some(self)
    }
}

impl AsyncTransport for TcpTransport {
    fn dispatch_async(&self, request: Request) -> AsyncCallHandle {
        AsyncCallHandle::from(self.dispatch(request))
    }
}

fn transport_err(e: impl ToString) -> RemoteFailure {
    RemoteFailure::Transport(e.to_string())
}
