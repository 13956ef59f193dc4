#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

use std::{collections::HashMap, sync::Mutex};

use checkout_types::proto::inventory::{
    inventory_client::InventoryClient, inventory_server::Inventory as InventoryRpc,
    DecrementRequest, DecrementResponse, ReadRequest, ReadResponse, WriteRequest, WriteResponse,
};
use tonic::{transport::Channel, transport::Endpoint, Request, Response, Status};
use tracing::{error, info};

/// Whether this node is the authoritative copy or a passive replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Primary,
    Backup,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "primary" => Ok(Self::Primary),
            "backup" => Ok(Self::Backup),
            other => Err(format!("unknown ROLE {other:?}, expected \"primary\" or \"backup\"")),
        }
    }
}

/// A single replica of the title→stock map (`SPEC_FULL.md` §4.7).
///
/// `DecrementStock` and `Read` are served by every node; `Write`'s
/// primary-only fan-out and `ReplicateWrite`'s unconditional overwrite are
/// the two halves of the replication protocol.
pub struct InventoryService {
    role: Role,
    stock: Mutex<HashMap<String, u64>>,
    backup_clients: Vec<InventoryClient<Channel>>,
}

impl InventoryService {
    /// `seed` is the initial title→stock map (the source seeds `"Book A": 1`).
    /// `backup_peers` is only meaningful for a `Primary`; each address is
    /// dialed lazily, so an unreachable backup does not block startup.
    pub fn new(role: Role, seed: HashMap<String, u64>, backup_peers: &[String]) -> Self {
        let backup_clients = backup_peers
            .iter()
            .map(|addr| {
                let uri = format!("http://{addr}");
                let channel = Endpoint::from_shared(uri).expect("invalid backup peer address").connect_lazy();
                InventoryClient::new(channel)
            })
            .collect();
        Self {
            role,
            stock: Mutex::new(seed),
            backup_clients,
        }
    }

    pub fn default_seed() -> HashMap<String, u64> {
        HashMap::from([("Book A".to_owned(), 1)])
    }
}

#[tonic::async_trait]
impl InventoryRpc for InventoryService {
    async fn read(&self, request: Request<ReadRequest>) -> Result<Response<ReadResponse>, Status> {
        let title = request.into_inner().title;
        let stock = *self.stock.lock().unwrap().get(&title).unwrap_or(&0);
        Ok(Response::new(ReadResponse { stock }))
    }

    async fn decrement_stock(
        &self,
        request: Request<DecrementRequest>,
    ) -> Result<Response<DecrementResponse>, Status> {
        let request = request.into_inner();
        let mut stock = self.stock.lock().unwrap();
        let available = *stock.get(&request.title).unwrap_or(&0);
        if available >= request.quantity {
            let remaining = available - request.quantity;
            stock.insert(request.title.clone(), remaining);
            info!(title = %request.title, remaining, "Decremented stock");
            Ok(Response::new(DecrementResponse {
                success: true,
                remaining,
            }))
        } else {
            Ok(Response::new(DecrementResponse {
                success: false,
                remaining: available,
            }))
        }
    }

    async fn write(
        &self,
        request: Request<WriteRequest>,
    ) -> Result<Response<WriteResponse>, Status> {
        if self.role != Role::Primary {
            return Err(Status::failed_precondition("Write is only served by the primary"));
        }
        let request = request.into_inner();
        self.stock
            .lock()
            .unwrap()
            .insert(request.title.clone(), request.new_stock);

        for client in &self.backup_clients {
            let mut client = client.clone();
            let replicate = WriteRequest {
                title: request.title.clone(),
                new_stock: request.new_stock,
            };
            if let Err(error) = client.replicate_write(Request::new(replicate)).await {
                error!(%error, title = %request.title, "Backup replication failed");
            }
        }

        Ok(Response::new(WriteResponse { success: true }))
    }

    async fn replicate_write(
        &self,
        request: Request<WriteRequest>,
    ) -> Result<Response<WriteResponse>, Status> {
        let request = request.into_inner();
        self.stock
            .lock()
            .unwrap()
            .insert(request.title.clone(), request.new_stock);
        info!(title = %request.title, new_stock = request.new_stock, "Replicated write applied");
        Ok(Response::new(WriteResponse { success: true }))
    }
}
