use crate::{proto, VectorClock};

/// Converts a domain type into its wire (protobuf) representation.
///
/// Mirrors the `IntoProto`/`FromProto` split used for every other message
/// type in this workspace: domain types stay free of `prost`-generated
/// field quirks (e.g. optional message fields), and the conversion lives in
/// one place per type.
pub trait IntoProto {
    type Proto;

    fn into_proto(self) -> Self::Proto;
}

impl IntoProto for VectorClock {
    type Proto = proto::common::VectorClock;

    fn into_proto(self) -> Self::Proto {
        Self::Proto {
            entries: self.entries().clone().into_iter().collect(),
        }
    }
}
