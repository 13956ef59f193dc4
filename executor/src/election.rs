use std::sync::Mutex;

use checkout_types::proto::executor::{
    executor_server::Executor as ExecutorRpc, AckResponse, AnnounceLeaderRequest,
    StartElectionRequest, StartElectionResponse,
};
use tonic::{Request, Response, Status};
use tracing::info;

use crate::Peer;

/// The replica's place in the bully protocol (`SPEC_FULL.md` §4.6).
/// `Booting` transitions to `Electing` once peer readiness is resolved;
/// `Electing` resolves to `Leader` (no higher peer acknowledged) or
/// `Follower` (an `AnnounceLeader` arrived).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Booting,
    Electing,
    Follower,
    Leader,
}

#[derive(Debug)]
struct State {
    phase: Phase,
    leader_id: Option<i32>,
}

/// One executor replica: its own id, the peer set it elects against, and
/// the election state mutated by the `Executor` RPC handlers below and by
/// the election driver in `run_loop.rs`.
pub struct ExecutorService {
    pub replica_id: i32,
    pub peers: Vec<Peer>,
    state: Mutex<State>,
}

impl ExecutorService {
    #[must_use]
    pub fn new(replica_id: i32, peers: Vec<Peer>) -> Self {
        Self {
            replica_id,
            peers,
            state: Mutex::new(State { phase: Phase::Booting, leader_id: None }),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.lock().unwrap().phase
    }

    #[must_use]
    pub fn leader_id(&self) -> Option<i32> {
        self.state.lock().unwrap().leader_id
    }

    #[must_use]
    pub fn is_leader(&self) -> bool {
        self.phase() == Phase::Leader
    }

    pub fn set_phase(&self, phase: Phase) {
        self.state.lock().unwrap().phase = phase;
    }

    /// Declares this replica the leader: `is_leader=true`, `leader_id=self`.
    pub fn declare_self_leader(&self) {
        let mut state = self.state.lock().unwrap();
        state.phase = Phase::Leader;
        state.leader_id = Some(self.replica_id);
    }

    /// Applies an `AnnounceLeader`: `leader_id` is set unconditionally;
    /// `is_leader` follows from whether the announced id is our own.
    fn apply_announced_leader(&self, leader_id: i32) {
        let mut state = self.state.lock().unwrap();
        state.leader_id = Some(leader_id);
        state.phase = if leader_id == self.replica_id { Phase::Leader } else { Phase::Follower };
    }
}

#[tonic::async_trait]
impl ExecutorRpc for ExecutorService {
    async fn start_election(
        &self,
        request: Request<StartElectionRequest>,
    ) -> Result<Response<StartElectionResponse>, Status> {
        let sender_id = request.into_inner().sender_id;
        let acknowledged = self.replica_id > sender_id;
        info!(replica_id = self.replica_id, sender_id, acknowledged, "StartElection");
        Ok(Response::new(StartElectionResponse { acknowledged }))
    }

    async fn announce_leader(
        &self,
        request: Request<AnnounceLeaderRequest>,
    ) -> Result<Response<AckResponse>, Status> {
        let leader_id = request.into_inner().leader_id;
        self.apply_announced_leader(leader_id);
        info!(replica_id = self.replica_id, leader_id, "AnnounceLeader");
        Ok(Response::new(AckResponse { received: true }))
    }
}
