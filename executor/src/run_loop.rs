use std::{sync::Arc, time::Duration};

use checkout_types::proto::{
    common::Empty,
    executor::{
        executor_client::ExecutorClient, AnnounceLeaderRequest, StartElectionRequest,
    },
    inventory::{inventory_client::InventoryClient, DecrementRequest, ReadRequest},
    queue::{order_queue_client::OrderQueueClient, DequeueResponse},
};
use tonic::transport::{Channel, Endpoint};
use tracing::{error, info, warn};

use crate::{election::ExecutorService, Peer};

const READINESS_MAX_ATTEMPTS: u32 = 10;
const READINESS_RETRY_INTERVAL: Duration = Duration::from_secs(2);
const READINESS_PROBE_TIMEOUT: Duration = Duration::from_secs(1);
const EXECUTION_LOOP_INTERVAL: Duration = Duration::from_secs(5);

async fn peer_channel(peer: &Peer) -> Option<Channel> {
    let endpoint = Endpoint::from_shared(format!("http://{}", peer.addr())).ok()?;
    tokio::time::timeout(READINESS_PROBE_TIMEOUT, endpoint.connect())
        .await
        .ok()?
        .ok()
}

/// Probes every peer's RPC channel for readiness, retrying up to
/// [`READINESS_MAX_ATTEMPTS`] times at [`READINESS_RETRY_INTERVAL`]
/// intervals. Returns once all peers answer, or once retries are
/// exhausted — either way the caller proceeds to election
/// (`SPEC_FULL.md` §4.6 step 1).
pub async fn wait_for_peer_readiness(replica_id: i32, peers: &[Peer]) {
    for attempt in 1..=READINESS_MAX_ATTEMPTS {
        info!(replica_id, attempt, "probing peers for readiness");
        let mut all_reachable = true;
        for peer in peers {
            if peer_channel(peer).await.is_none() {
                all_reachable = false;
                break;
            }
        }
        if all_reachable {
            info!(replica_id, "all peers reachable, proceeding to election");
            return;
        }
        tokio::time::sleep(READINESS_RETRY_INTERVAL).await;
    }
    warn!(replica_id, "could not reach all peers after {READINESS_MAX_ATTEMPTS} attempts, electing anyway");
}

/// Runs one round of the bully protocol: ask every peer with a higher id
/// whether it is alive, and either yield (a higher peer acknowledged) or
/// declare self leader and broadcast `AnnounceLeader` to everyone
/// (`SPEC_FULL.md` §4.6 step 2).
pub async fn run_election_round(service: &ExecutorService) {
    service.set_phase(crate::Phase::Electing);
    info!(replica_id = service.replica_id, "initiating election");

    let higher_peers: Vec<_> = service.peers.iter().filter(|peer| peer.id > service.replica_id).collect();
    let mut received_ok = false;
    for peer in &higher_peers {
        match peer_channel(peer).await {
            Some(channel) => {
                let mut client = ExecutorClient::new(channel);
                let request = StartElectionRequest { sender_id: service.replica_id };
                match client.start_election(request).await {
                    Ok(response) if response.into_inner().acknowledged => {
                        info!(replica_id = service.replica_id, peer_id = peer.id, "received ack");
                        received_ok = true;
                    }
                    Ok(_) => {}
                    Err(error) => warn!(replica_id = service.replica_id, peer_id = peer.id, %error, "election probe failed"),
                }
            }
            None => warn!(replica_id = service.replica_id, peer_id = peer.id, "could not contact peer for election"),
        }
    }

    if received_ok {
        info!(replica_id = service.replica_id, "yielding to a higher peer");
        return;
    }

    service.declare_self_leader();
    info!(replica_id = service.replica_id, "no higher peer acknowledged, declaring self leader");

    for peer in &service.peers {
        if let Some(channel) = peer_channel(peer).await {
            let mut client = ExecutorClient::new(channel);
            let request = AnnounceLeaderRequest { leader_id: service.replica_id };
            if let Err(error) = client.announce_leader(request).await {
                warn!(replica_id = service.replica_id, peer_id = peer.id, %error, "could not announce leadership");
            }
        } else {
            warn!(replica_id = service.replica_id, peer_id = peer.id, "could not reach peer to announce leadership");
        }
    }
}

/// Which title/quantity the leader decrements on each dequeued order. The
/// queue entry itself carries no item data (`SPEC_FULL.md` §3's `Priority
/// Queue Entry` is `(priority_score, enqueue_timestamp, order_id)` only),
/// mirroring the source's own hardcoded single-book decrement — see
/// DESIGN.md for the grounding.
#[derive(Clone, Debug)]
pub struct ExecutionTarget {
    pub title: String,
    pub quantity: u64,
}

/// The leader-only loop: every [`EXECUTION_LOOP_INTERVAL`], dequeue one
/// order and attempt to decrement `target` against the inventory primary
/// (`SPEC_FULL.md` §4.6's execution loop). Runs until the process exits;
/// there is no re-election on leader failure (open question, decided in
/// DESIGN.md).
pub async fn run_execution_loop(
    replica_id: i32,
    mut queue_client: OrderQueueClient<Channel>,
    mut inventory_client: InventoryClient<Channel>,
    target: ExecutionTarget,
) {
    let mut ticker = tokio::time::interval(EXECUTION_LOOP_INTERVAL);
    loop {
        ticker.tick().await;
        let dequeued = match queue_client.dequeue(Empty {}).await {
            Ok(response) => response.into_inner(),
            Err(error) => {
                error!(replica_id, %error, "failed to dequeue");
                continue;
            }
        };
        execute_one(replica_id, &mut inventory_client, dequeued, &target).await;
    }
}

async fn execute_one(
    replica_id: i32,
    inventory_client: &mut InventoryClient<Channel>,
    dequeued: DequeueResponse,
    target: &ExecutionTarget,
) {
    if dequeued.order_id.is_empty() {
        info!(replica_id, "queue is empty");
        return;
    }
    let order_id = dequeued.order_id;

    match inventory_client.read(ReadRequest { title: target.title.clone() }).await {
        Ok(response) => info!(replica_id, %order_id, title = %target.title, stock = response.into_inner().stock, "read stock before decrement"),
        Err(error) => warn!(replica_id, %order_id, %error, "read failed, proceeding to decrement anyway"),
    }

    match inventory_client
        .decrement_stock(DecrementRequest { title: target.title.clone(), quantity: target.quantity })
        .await
    {
        Ok(response) => {
            let response = response.into_inner();
            if response.success {
                info!(replica_id, %order_id, remaining = response.remaining, "order executed");
            } else {
                info!(replica_id, %order_id, "order out of stock, dropped");
            }
        }
        Err(error) => error!(replica_id, %order_id, %error, "decrement call failed"),
    }
}
