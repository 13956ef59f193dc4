//! Generated protobuf/gRPC code, one module per `.proto` package.

pub mod common {
    tonic::include_proto!("checkout.common");
}

pub mod fraud {
    tonic::include_proto!("checkout.fraud");
}

pub mod transaction {
    tonic::include_proto!("checkout.transaction");
}

pub mod suggestions {
    tonic::include_proto!("checkout.suggestions");
}

pub mod queue {
    tonic::include_proto!("checkout.queue");
}

pub mod executor {
    tonic::include_proto!("checkout.executor");
}

pub mod inventory {
    tonic::include_proto!("checkout.inventory");
}
