pub mod algorithms;
pub mod clock;
pub mod config;
pub mod error;
pub mod forwarding;
pub mod geometry;
pub mod graph;
pub mod interfaces;
pub mod manager;
pub mod metrics;
pub mod mobility;
pub mod packet;
pub mod registry;
pub mod runtime;
pub mod table;

use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Stable index of a registered node, assigned by the scenario.
pub type NodeId = usize;
pub type Address = Ipv4Addr;

/// The single network-wide route authority, shared between the update task
/// and the per-node forwarding components.
pub type SharedNodeManager = Arc<RwLock<manager::NodeManager>>;
