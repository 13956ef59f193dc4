#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

use std::net::SocketAddr;

use anyhow::{Context as _, Result as AnyResult};
use checkout_types::{proto::inventory::inventory_server::InventoryServer, LogOptions};
use inventory_store::{InventoryService, Role};
use structopt::StructOpt;
use tonic::transport::Server;
use tracing::info;

#[derive(StructOpt)]
struct Options {
    #[structopt(flatten)]
    log: LogOptions,

    /// Socket address this service's gRPC server binds to.
    #[structopt(long, env = "PORT", default_value = "[::1]:50060")]
    bind: SocketAddr,

    /// Whether this node is the authoritative primary or a passive backup.
    #[structopt(long, env = "ROLE", default_value = "primary")]
    role: Role,

    /// Comma-separated `host:port` list of backup peers. Only consulted on
    /// a primary.
    #[structopt(long, env = "BACKUP_PEERS", default_value = "")]
    backup_peers: String,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    let options = Options::from_args();
    options.log.init()?;

    let backup_peers = options
        .backup_peers
        .split(',')
        .map(str::trim)
        .filter(|peer| !peer.is_empty())
        .map(str::to_owned)
        .collect::<Vec<_>>();

    info!(role = ?options.role, peers = ?backup_peers, "Inventory Store starting...");
    let service = InventoryService::new(options.role, InventoryService::default_seed(), &backup_peers);
    Server::builder()
        .add_service(InventoryServer::new(service))
        .serve(options.bind)
        .await
        .with_context(|| format!("error serving inventory-store on {}", options.bind))?;

    Ok(())
}
