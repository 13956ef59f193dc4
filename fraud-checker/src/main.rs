#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

use std::net::SocketAddr;

use anyhow::{Context as _, Result as AnyResult};
use checkout_types::{proto::fraud::fraud_checker_server::FraudCheckerServer, LogOptions};
use fraud_checker::FraudCheckerService;
use structopt::StructOpt;
use tonic::transport::Server;
use tracing::info;

#[derive(StructOpt)]
struct Options {
    #[structopt(flatten)]
    log: LogOptions,

    /// Socket address this service's gRPC server binds to.
    #[structopt(long, env = "PORT", default_value = "[::1]:50051")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    let options = Options::from_args();
    options.log.init()?;

    info!("Starting Fraud Detection Service...");
    let service = FraudCheckerService::new();
    Server::builder()
        .add_service(FraudCheckerServer::new(service))
        .serve(options.bind)
        .await
        .with_context(|| format!("error serving fraud checker on {}", options.bind))?;

    Ok(())
}
