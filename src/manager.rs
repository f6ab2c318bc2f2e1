use crate::algorithms::{
    DijkstraAllPairsOutput, find_all_shortest_paths, find_all_shortest_paths_to_destination,
};
use crate::config::DsprConfig;
use crate::forwarding::Dspr;
use crate::geometry::Coord;
use crate::graph::build_graph;
use crate::mobility::PositionOracle;
use crate::registry::NodeRegistry;
use crate::table::RoutingTable;
use crate::{Address, NodeId};
use log::{debug, info};
use std::sync::{Arc, Weak};

/// The network-wide route authority: sole owner of the registry, the graph
/// outputs and the routing table. Forwarding components query it through a
/// shared read handle; the periodic update task is the only writer.
pub struct NodeManager {
    config: DsprConfig,
    oracle: Arc<dyn PositionOracle>,
    registry: NodeRegistry,
    routing_table: RoutingTable,
    all_shortest_paths: DijkstraAllPairsOutput,
    dest_address: Option<Address>,
    dest_position: Option<Coord>,
    forwarders: Vec<Weak<Dspr>>,
}

impl NodeManager {
    pub fn new(config: DsprConfig, oracle: Arc<dyn PositionOracle>) -> Self {
        Self {
            config,
            oracle,
            registry: NodeRegistry::new(),
            routing_table: RoutingTable::new(),
            all_shortest_paths: DijkstraAllPairsOutput::default(),
            dest_address: None,
            dest_position: None,
            forwarders: Vec::new(),
        }
    }

    pub fn register_client(&mut self, node: NodeId, address: Address) {
        self.registry.register(node, address);
    }

    /// Removes the node from future recomputations. Routes already in the
    /// table keep referencing it until the next `recalculate_routes`.
    pub fn deregister_client(&mut self, node: NodeId) {
        self.registry.deregister(node);
    }

    /// Keeps a non-owning handle to a forwarding component for event
    /// delivery. Dropped components are pruned on the next notification.
    pub fn attach_forwarder(&mut self, forwarder: &Arc<Dspr>) {
        self.forwarders.push(Arc::downgrade(forwarder));
    }

    pub fn config(&self) -> &DsprConfig {
        &self.config
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    pub fn all_shortest_paths(&self) -> &DijkstraAllPairsOutput {
        &self.all_shortest_paths
    }

    pub fn dest_address(&self) -> Option<Address> {
        self.dest_address
    }

    /// Position of the designated destination/ground station, refreshed on
    /// the last recomputation cycle.
    pub fn dest_position(&self) -> Option<Coord> {
        self.dest_position
    }

    /// Full rebuild: snapshot the registry, build the connectivity graph,
    /// run the shortest-path engine and flatten the result. The fresh table
    /// is built aside and swapped in at the end, so a reader scheduled
    /// between two cycles only ever observes a complete table.
    pub fn recalculate_routes(&mut self) {
        let addresses = self.registry.active_addresses().to_vec();
        let positions = self.registry.active_positions(self.oracle.as_ref());

        let dest_index = self
            .config
            .destination_addresses
            .iter()
            .find_map(|d| addresses.iter().position(|a| a == d));
        self.dest_address = dest_index.map(|i| addresses[i]);
        self.dest_position = dest_index.map(|i| positions[i]);

        let adjacency = build_graph(
            &positions,
            self.config.communication_range,
            dest_index,
            self.config.ground_station_range,
            self.config.usable_communication_range_ratio,
        );
        self.log_graph(&adjacency);

        let output = if self.config.destination_addresses.is_empty() {
            find_all_shortest_paths(&adjacency, &addresses)
        } else {
            find_all_shortest_paths_to_destination(
                &adjacency,
                &addresses,
                &self.config.destination_addresses,
            )
        };

        let table = RoutingTable::from_all_pairs(&output, &addresses);
        self.routing_table = table;
        self.all_shortest_paths = output;

        info!(
            "routes recalculated: {} active nodes, {} entries",
            addresses.len(),
            self.routing_table.len()
        );
        self.log_routing_table();
    }

    /// Pure lookup against the current table; never triggers recomputation.
    pub fn find_next_hop(&self, current: &Address, destination: &Address) -> Option<Address> {
        self.routing_table.find_next_hop(current, destination)
    }

    /// Fans a link-break event out to the attached forwarding components.
    /// The broken edge disappears from the graph at the next rebuild.
    pub fn notify_link_broken(&mut self, a: Address, b: Address) {
        self.forwarders.retain(|weak| weak.upgrade().is_some());
        for weak in &self.forwarders {
            if let Some(forwarder) = weak.upgrade() {
                forwarder.handle_link_broken(a, b);
            }
        }
    }

    fn log_routing_table(&self) {
        for entry in self.routing_table.iter() {
            debug!(
                "route {} -> {} via {} ({} hops)",
                entry.source, entry.destination, entry.next_hop, entry.hop_count
            );
        }
    }

    fn log_graph(&self, adjacency: &[Vec<u32>]) {
        for (i, row) in adjacency.iter().enumerate() {
            debug!("graph row {}: {:?}", i, row);
        }
    }
}
