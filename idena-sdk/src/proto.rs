//! Protobuf messages exchanged with the host.
//!
//! Field numbers match the models the node compiles, so a message encoded here
//! decodes on the host side and back.
use prost::Message;

/// Payload of a structured argument blob, after the format byte.
#[derive(Clone, PartialEq, Message)]
pub struct ProtoArgs {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub args: Vec<Vec<u8>>,
}

/// Identity record returned by the `identity` import and by get-identity promises.
#[derive(Clone, PartialEq, Message)]
pub struct ProtoStateIdentity {
    /// Big-endian stake amount.
    #[prost(bytes = "vec", tag = "1")]
    pub stake: Vec<u8>,
    #[prost(uint32, tag = "3")]
    pub birthday: u32,
    #[prost(uint32, tag = "4")]
    pub state: u32,
}
