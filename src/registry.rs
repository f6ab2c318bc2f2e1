use crate::mobility::PositionOracle;
use crate::{Address, NodeId};
use crate::geometry::Coord;
use log::{debug, warn};

/// Active participants of the network, kept as parallel vectors so the graph
/// builder and the shortest-path engine can work on plain indices. Index i of
/// `nodes`, `addresses` and any position snapshot always refers to the same
/// node.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: Vec<NodeId>,
    addresses: Vec<Address>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, node: NodeId, address: Address) {
        if self.nodes.contains(&node) {
            warn!("node {} is already registered, ignoring", node);
            return;
        }
        debug!("registering node {} with address {}", node, address);
        self.nodes.push(node);
        self.addresses.push(address);
    }

    pub fn deregister(&mut self, node: NodeId) {
        match self.nodes.iter().position(|n| *n == node) {
            Some(index) => {
                self.nodes.remove(index);
                let address = self.addresses.remove(index);
                debug!("deregistered node {} ({})", node, address);
            }
            None => warn!("deregister for unknown node {}", node),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn active_nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn active_addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Snapshot of current positions, re-read from the oracle at call time.
    /// A node the oracle cannot locate falls back to the origin.
    pub fn active_positions(&self, oracle: &dyn PositionOracle) -> Vec<Coord> {
        self.nodes
            .iter()
            .map(|node| match oracle.current_position(*node) {
                Some(position) => position,
                None => {
                    warn!("no position for node {}, assuming origin", node);
                    Coord::default()
                }
            })
            .collect()
    }

    pub fn index_of_address(&self, address: &Address) -> Option<usize> {
        self.addresses.iter().position(|a| a == address)
    }
}
