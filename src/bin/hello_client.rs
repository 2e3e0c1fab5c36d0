//! Consumer process: resolves a proxy to the hello host and drives the four
//! invocation styles sequentially.

use clap::Parser;
use hello_remote::{
    client::{HelloClient, HelloProxy},
    handle::RemoteFailure,
    net::client::TcpTransport,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Consumer process driving the four hello invocation styles")]
struct Args {
    /// Address of the hello host
    #[arg(long, default_value = "127.0.0.1:8888")]
    addr: SocketAddr,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), RemoteFailure> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let transport = TcpTransport::new(args.addr);
    transport.ping().await?;
    info!("resolved hello proxy at {}", args.addr);

    let client = HelloClient::new(HelloProxy::new(Arc::new(transport)));
    client.run_all("hello-client").await;
    Ok(())
}
