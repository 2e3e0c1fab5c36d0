use super::{Frame, Reply};
use crate::{
    dispatcher::Dispatcher,
    types::Typed,
    RpcFunction,
};
use async_bincode::tokio::AsyncBincodeStream;
use futures::{SinkExt, StreamExt};
use std::{io, net::Ipv4Addr, sync::Arc};
use tokio::{io::BufStream, net::TcpListener, task};
use tracing::{debug, info};

/// Host-side TCP server answering pings and dispatching calls.
#[derive(Default)]
pub struct Server {
    dispatcher: Dispatcher,
}

impl Server {
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
        info!("registered remote function {:?}", rpc_function.name());
        self.dispatcher.add(rpc_function);
    }

    async fn handle_frame(self: Arc<Self>, frame: Frame) -> Reply {
        match frame {
            Frame::Ping => Reply::Pong,
            Frame::Call(request) => Reply::Call(self.dispatcher.call(request).await),
        }
    }

    /// Serves until the task is dropped or the listener fails.
    pub async fn serve_tcp(self, port: u16) -> io::Result<()> {
        let root_arc = Arc::new(self);
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await?;
        info!("hello host listening on port {port}");
        loop {
            let arc_self = root_arc.clone();
            let (sock, peer) = listener.accept().await?;
            let mut sock =
                AsyncBincodeStream::<_, Frame, Reply, _>::from(BufStream::new(sock)).for_async();

            task::spawn(async move {
                while let Some(Ok(frame)) = sock.next().await {
                    let reply = arc_self.clone().handle_frame(frame).await;
                    if sock.send(reply).await.is_err() {
                        break;
                    }
                }
                debug!("connection from {peer} closed");
            });
        }
    }
}
