#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

//! Shared schema and ambient-stack plumbing used by every binary in the
//! checkout pipeline: the generated gRPC messages/clients/servers, the
//! vector-clock type all the checkers exchange, and the `structopt` +
//! `tracing` boilerplate every service's `main.rs` wires up the same way.

mod from_proto;
mod into_proto;
mod logging;
pub mod proto;
mod vector_clock;

pub use from_proto::FromProto;
pub use into_proto::IntoProto;
pub use logging::LogOptions;
pub use vector_clock::VectorClock;
