#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

use std::net::SocketAddr;

use anyhow::{Context as _, Result as AnyResult};
use checkout_types::{proto::queue::order_queue_server::OrderQueueServer, LogOptions};
use order_queue::OrderQueueService;
use structopt::StructOpt;
use tonic::transport::Server;
use tracing::info;

#[derive(StructOpt)]
struct Options {
    #[structopt(flatten)]
    log: LogOptions,

    /// Socket address this service's gRPC server binds to.
    #[structopt(long, env = "PORT", default_value = "[::1]:50056")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    let options = Options::from_args();
    options.log.init()?;

    info!("Order Queue Service starting...");
    let service = OrderQueueService::new();
    Server::builder()
        .add_service(OrderQueueServer::new(service))
        .serve(options.bind)
        .await
        .with_context(|| format!("error serving order-queue on {}", options.bind))?;

    Ok(())
}
