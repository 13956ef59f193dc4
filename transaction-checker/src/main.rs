#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

use std::net::SocketAddr;

use anyhow::{Context as _, Result as AnyResult};
use checkout_types::{
    proto::transaction::transaction_checker_server::TransactionCheckerServer, LogOptions,
};
use structopt::StructOpt;
use tonic::transport::Server;
use tracing::info;
use transaction_checker::TransactionCheckerService;

#[derive(StructOpt)]
struct Options {
    #[structopt(flatten)]
    log: LogOptions,

    /// Socket address this service's gRPC server binds to.
    #[structopt(long, env = "PORT", default_value = "[::1]:50052")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    let options = Options::from_args();
    options.log.init()?;

    info!("Transaction Verification Service starting...");
    let service = TransactionCheckerService::new();
    Server::builder()
        .add_service(TransactionCheckerServer::new(service))
        .serve(options.bind)
        .await
        .with_context(|| format!("error serving transaction checker on {}", options.bind))?;

    Ok(())
}
