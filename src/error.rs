use crate::Address;
use thiserror::Error;

/// Per-packet failures. Absence of a route is not represented here: it is a
/// routing outcome (the packet is dropped and a failure observation emitted),
/// not an error. These variants abort handling of the offending packet only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DsprError {
    #[error("routing metadata missing from packet header")]
    MissingRoutingMetadata,

    #[error("transit packet without routing metadata: source {source_addr}, destination {destination}")]
    MetadataMissingInTransit {
        source_addr: Address,
        destination: Address,
    },

    #[error("unknown egress interface `{0}`")]
    UnknownInterface(String),
}
