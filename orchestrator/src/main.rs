#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

use std::net::SocketAddr;

use anyhow::{Context as _, Result as AnyResult};
use checkout_types::{
    proto::{
        fraud::fraud_checker_client::FraudCheckerClient,
        queue::order_queue_client::OrderQueueClient,
        suggestions::suggestions_client::SuggestionsClient,
        transaction::transaction_checker_client::TransactionCheckerClient,
    },
    LogOptions,
};
use orchestrator::App;
use structopt::StructOpt;
use tonic::transport::Endpoint;
use tracing::info;

#[derive(StructOpt)]
struct Options {
    #[structopt(flatten)]
    log: LogOptions,

    /// Socket address this service's HTTP server binds to.
    #[structopt(long, env = "PORT", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    #[structopt(long, env = "FRAUD_ADDR", default_value = "[::1]:50051")]
    fraud_addr: String,

    #[structopt(long, env = "TRANSACTION_ADDR", default_value = "[::1]:50052")]
    transaction_addr: String,

    #[structopt(long, env = "SUGGESTIONS_ADDR", default_value = "[::1]:50053")]
    suggestions_addr: String,

    #[structopt(long, env = "QUEUE_ADDR", default_value = "[::1]:50056")]
    queue_addr: String,
}

fn lazy_channel(addr: &str) -> AnyResult<tonic::transport::Channel> {
    Ok(Endpoint::from_shared(format!("http://{addr}"))
        .with_context(|| format!("invalid service address {addr:?}"))?
        .connect_lazy())
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    let options = Options::from_args();
    options.log.init()?;

    info!("Orchestrator starting...");
    let app = App::new(
        FraudCheckerClient::new(lazy_channel(&options.fraud_addr)?),
        TransactionCheckerClient::new(lazy_channel(&options.transaction_addr)?),
        SuggestionsClient::new(lazy_channel(&options.suggestions_addr)?),
        OrderQueueClient::new(lazy_channel(&options.queue_addr)?),
    );

    orchestrator::serve(app, &options.bind).await
}
