#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context as _, Result as AnyResult};
use checkout_types::{
    proto::{
        executor::executor_server::ExecutorServer, inventory::inventory_client::InventoryClient,
        queue::order_queue_client::OrderQueueClient,
    },
    LogOptions,
};
use executor::{
    parse_peers, run_election_round, run_execution_loop, wait_for_peer_readiness, ExecutionTarget,
    ExecutorService,
};
use structopt::StructOpt;
use tonic::transport::{Endpoint, Server};
use tracing::info;

#[derive(StructOpt)]
struct Options {
    #[structopt(flatten)]
    log: LogOptions,

    /// This replica's own id in the bully protocol.
    #[structopt(long, env = "REPLICA_ID", default_value = "1")]
    replica_id: i32,

    /// Socket address this replica's gRPC server binds to.
    #[structopt(long, env = "REPLICA_PORT", default_value = "[::1]:50054")]
    replica_port: SocketAddr,

    /// Comma-separated `id:host:port` triples naming the other replicas.
    #[structopt(long, env = "PEERS", default_value = "")]
    peers: String,

    /// Address of the priority queue this replica drains when it is leader.
    #[structopt(long, env = "QUEUE_ADDR", default_value = "[::1]:50056")]
    queue_addr: String,

    /// Address of the inventory primary the leader decrements stock against.
    #[structopt(long, env = "INVENTORY_ADDR", default_value = "[::1]:50060")]
    inventory_addr: String,

    /// Title the leader decrements on every dequeued order. The queue
    /// carries no per-order item data (`SPEC_FULL.md` §3), so a single
    /// configured target title stands in, mirroring the source's own
    /// hardcoded single-book decrement (see DESIGN.md).
    #[structopt(long, env = "EXECUTION_TARGET_TITLE", default_value = "Book A")]
    target_title: String,

    /// Quantity decremented per executed order.
    #[structopt(long, env = "EXECUTION_TARGET_QUANTITY", default_value = "1")]
    target_quantity: u64,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    let options = Options::from_args();
    options.log.init()?;

    let peers = parse_peers(&options.peers);
    info!(replica_id = options.replica_id, ?peers, "Order Executor starting...");

    let service = Arc::new(ExecutorService::new(options.replica_id, peers.clone()));

    let server_service = Arc::clone(&service);
    let bind = options.replica_port;
    tokio::spawn(async move {
        if let Err(error) = Server::builder()
            .add_service(ExecutorServer::from_arc(server_service))
            .serve(bind)
            .await
        {
            tracing::error!(%error, "executor gRPC server exited");
        }
    });

    let election_service = Arc::clone(&service);
    let queue_addr = options.queue_addr.clone();
    let inventory_addr = options.inventory_addr.clone();
    let target =
        ExecutionTarget { title: options.target_title.clone(), quantity: options.target_quantity };
    tokio::spawn(async move {
        wait_for_peer_readiness(election_service.replica_id, &election_service.peers).await;
        run_election_round(&election_service).await;

        if election_service.is_leader() {
            let queue_endpoint = match Endpoint::from_shared(format!("http://{queue_addr}"))
                .context("invalid queue address")
            {
                Ok(endpoint) => endpoint,
                Err(error) => {
                    tracing::error!(%error, "could not build queue client");
                    return;
                }
            };
            let inventory_endpoint = match Endpoint::from_shared(format!("http://{inventory_addr}"))
                .context("invalid inventory address")
            {
                Ok(endpoint) => endpoint,
                Err(error) => {
                    tracing::error!(%error, "could not build inventory client");
                    return;
                }
            };
            let queue_client = OrderQueueClient::new(queue_endpoint.connect_lazy());
            let inventory_client = InventoryClient::new(inventory_endpoint.connect_lazy());
            run_execution_loop(election_service.replica_id, queue_client, inventory_client, target)
                .await;
        }
    });

    // Block forever; the spawned tasks above carry the server and the
    // election/execution lifecycle.
    std::future::pending::<()>().await;
    Ok(())
}
