#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

use std::net::SocketAddr;

use anyhow::{Context as _, Result as AnyResult};
use checkout_types::{proto::suggestions::suggestions_server::SuggestionsServer, LogOptions};
use structopt::StructOpt;
use suggestions::SuggestionsService;
use tonic::transport::Server;
use tracing::info;

#[derive(StructOpt)]
struct Options {
    #[structopt(flatten)]
    log: LogOptions,

    /// Socket address this service's gRPC server binds to.
    #[structopt(long, env = "PORT", default_value = "[::1]:50053")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    let options = Options::from_args();
    options.log.init()?;

    info!("Suggestions Service starting...");
    let service = SuggestionsService::new();
    Server::builder()
        .add_service(SuggestionsServer::new(service))
        .serve(options.bind)
        .await
        .with_context(|| format!("error serving suggestions on {}", options.bind))?;

    Ok(())
}
