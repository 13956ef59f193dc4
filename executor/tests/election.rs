use std::{net::SocketAddr, sync::Arc, time::Duration};

use checkout_types::proto::executor::executor_server::ExecutorServer;
use executor::{run_election_round, wait_for_peer_readiness, ExecutorService, Peer};
use pretty_assertions::assert_eq;
use tonic::transport::Server;

fn free_addr() -> SocketAddr {
    std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap()
}

fn spawn_replica(service: Arc<ExecutorService>, addr: SocketAddr) {
    tokio::spawn(async move {
        Server::builder()
            .add_service(ExecutorServer::from_arc(service))
            .serve(addr)
            .await
            .unwrap();
    });
}

fn peers_excluding(all: &[(i32, SocketAddr)], self_id: i32) -> Vec<Peer> {
    all.iter()
        .filter(|(id, _)| *id != self_id)
        .map(|(id, addr)| Peer { id: *id, host: addr.ip().to_string(), port: addr.port() })
        .collect()
}

/// Drives the end-to-end election scenario from `SPEC_FULL.md` §8 scenario
/// 6: three replicas {1,2,3} start concurrently; replica 3 must become
/// leader, and replicas 1 and 2 must observe it via `AnnounceLeader`.
#[tokio::test]
async fn highest_id_becomes_leader_and_peers_observe_it() {
    let all = [(1, free_addr()), (2, free_addr()), (3, free_addr())];

    let service1 = Arc::new(ExecutorService::new(1, peers_excluding(&all, 1)));
    let service2 = Arc::new(ExecutorService::new(2, peers_excluding(&all, 2)));
    let service3 = Arc::new(ExecutorService::new(3, peers_excluding(&all, 3)));

    spawn_replica(Arc::clone(&service1), all[0].1);
    spawn_replica(Arc::clone(&service2), all[1].1);
    spawn_replica(Arc::clone(&service3), all[2].1);
    tokio::time::sleep(Duration::from_millis(200)).await;

    tokio::join!(
        wait_for_peer_readiness(1, &service1.peers),
        wait_for_peer_readiness(2, &service2.peers),
        wait_for_peer_readiness(3, &service3.peers),
    );

    tokio::join!(
        run_election_round(&service1),
        run_election_round(&service2),
        run_election_round(&service3),
    );

    assert_eq!(service3.leader_id(), Some(3));
    assert!(service3.is_leader());
    assert_eq!(service1.leader_id(), Some(3));
    assert!(!service1.is_leader());
    assert_eq!(service2.leader_id(), Some(3));
    assert!(!service2.is_leader());
}
