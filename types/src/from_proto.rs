use std::collections::BTreeMap;

use crate::{proto, VectorClock};

/// Converts a wire (protobuf) message into its domain representation.
pub trait FromProto {
    type Proto;

    fn from_proto(proto: Self::Proto) -> Self;
}

// `prost` represents a `message` field as `Option<T>` since proto3 has no
// required-field notion; callers always hand us the optional form.
impl FromProto for VectorClock {
    type Proto = Option<proto::common::VectorClock>;

    fn from_proto(proto: Self::Proto) -> Self {
        proto.map_or_else(Self::default, |vc| {
            vc.entries.into_iter().collect::<BTreeMap<_, _>>().into()
        })
    }
}
