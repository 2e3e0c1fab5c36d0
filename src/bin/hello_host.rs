//! Host process: registers the hello service and serves it over TCP until
//! stopped with ctrl-c.

use clap::Parser;
use hello_remote::{
    net::server::Server,
    service::{Hello, HelloWithMessage},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Host process exposing the hello service over TCP")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 8888)]
    port: u16,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut server = Server::new();
    server.add(Hello);
    server.add(HelloWithMessage);

    tokio::select! {
        res = server.serve_tcp(args.port) => res,
        _ = tokio::signal::ctrl_c() => {
            info!("stop requested; shutting down hello host");
            Ok(())
        }
    }
}
