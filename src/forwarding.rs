use crate::clock::{Clock, SimTime};
use crate::config::DsprConfig;
use crate::error::DsprError;
use crate::interfaces::InterfaceSelector;
use crate::metrics::{Observation, RecordingWindow, SignalRecorder};
use crate::mobility::PositionOracle;
use crate::packet::{DsprInfo, Packet};
use crate::{Address, NodeId, SharedNodeManager};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Terminal outcome of a forwarding hook. A dropped packet is not requeued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Drop,
}

/// Per-node forwarding component. Holds a shared read handle to the route
/// authority and decides, hook by hook, what happens to each datagram.
pub struct Dspr {
    node: NodeId,
    self_address: Address,
    manager: SharedNodeManager,
    oracle: Arc<dyn PositionOracle>,
    clock: Arc<dyn Clock>,
    signals: Arc<SignalRecorder>,
    selector: InterfaceSelector,
    config: DsprConfig,
    window: RecordingWindow,
    packet_id: Mutex<u32>,
    packets_received: AtomicU32,
    link_breaks: AtomicU32,
}

impl Dspr {
    pub fn new(
        node: NodeId,
        self_address: Address,
        manager: SharedNodeManager,
        oracle: Arc<dyn PositionOracle>,
        clock: Arc<dyn Clock>,
        signals: Arc<SignalRecorder>,
        selector: InterfaceSelector,
        config: DsprConfig,
    ) -> Self {
        let window = config.recording_window();
        Self {
            node,
            self_address,
            manager,
            oracle,
            clock,
            signals,
            selector,
            config,
            window,
            packet_id: Mutex::new(0),
            packets_received: AtomicU32::new(0),
            link_breaks: AtomicU32::new(0),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn self_address(&self) -> Address {
        self.self_address
    }

    pub fn packets_received(&self) -> u32 {
        self.packets_received.load(Ordering::Relaxed)
    }

    pub fn link_breaks_seen(&self) -> u32 {
        self.link_breaks.load(Ordering::Relaxed)
    }

    fn is_for_local_delivery(&self, destination: &Address) -> bool {
        destination.is_multicast()
            || destination.is_broadcast()
            || *destination == self.self_address
    }

    fn in_window(&self, creation_time: Option<SimTime>) -> bool {
        creation_time.is_some_and(|t| self.window.contains(t))
    }

    /// Locally originated packet leaving this node. Stamps the composite
    /// packet identity, attaches routing metadata and routes, except for
    /// multicast/broadcast/local destinations which pass through untouched.
    pub async fn datagram_local_out_hook(
        &self,
        packet: &mut Packet,
    ) -> Result<Decision, DsprError> {
        if packet.creation_time.is_none() {
            warn!("creation time missing from outgoing packet");
        }

        let combined_id = {
            let mut id = self.packet_id.lock().unwrap();
            let combined = self.node as f64 + f64::from(*id) / 10000.0;
            if self.in_window(packet.creation_time) {
                self.signals.emit(Observation::PacketIdSent(combined));
                *id += 1;
            }
            combined
        };

        let destination = packet.destination();
        if self.is_for_local_delivery(&destination) {
            return Ok(Decision::Accept);
        }

        let mut dspr_info = DsprInfo::new();
        dspr_info.node_packet_id = combined_id;
        packet.header.attach_dspr_info(dspr_info);
        self.route_datagram(packet).await
    }

    /// Transit packet arriving from a neighbor. Metadata must already be
    /// present on anything that needs routing here.
    pub async fn datagram_pre_routing_hook(
        &self,
        packet: &mut Packet,
    ) -> Result<Decision, DsprError> {
        let destination = packet.destination();
        if self.is_for_local_delivery(&destination) {
            return Ok(Decision::Accept);
        }
        if packet.header.find_dspr_info().is_none() {
            return Err(DsprError::MetadataMissingInTransit {
                source_addr: packet.source(),
                destination,
            });
        }
        self.route_datagram(packet).await
    }

    /// Packet delivered to this node. Reads the correlation identity back
    /// out; a packet without metadata is still delivered.
    pub fn datagram_local_in_hook(&self, packet: &Packet) -> Decision {
        self.packets_received.fetch_add(1, Ordering::Relaxed);

        match packet.header.find_dspr_info() {
            Some(dspr_info) => {
                debug!(
                    "node {}: received packet id {}",
                    self.node, dspr_info.node_packet_id
                );
                if self.in_window(packet.creation_time) {
                    self.signals
                        .emit(Observation::PacketIdReceived(dspr_info.node_packet_id));
                }
            }
            None => warn!(
                "node {}: routing metadata missing on delivered packet, skipping correlation",
                self.node
            ),
        }
        Decision::Accept
    }

    async fn route_datagram(&self, packet: &mut Packet) -> Result<Decision, DsprError> {
        let source = self.self_address;
        let destination = packet.destination();
        debug!(
            "finding next hop: source = {}, destination = {}",
            source, destination
        );

        let (next_hop, dest_position) = {
            let manager = self.manager.read().await;
            (
                manager.find_next_hop(&source, &destination),
                manager.dest_position(),
            )
        };

        packet.next_hop_tag = next_hop;
        let Some(next_hop) = next_hop else {
            warn!(
                "no next hop found, dropping packet: source = {}, destination = {}",
                source, destination
            );
            self.signals
                .emit(Observation::RoutingFailed(self.clock.now()));
            if self.config.display_bubbles {
                info!("node {}: no next hop found, dropping packet", self.node);
            }
            return Ok(Decision::Drop);
        };

        let dspr_info = packet
            .header
            .find_dspr_info_mut()
            .ok_or(DsprError::MissingRoutingMetadata)?;
        dspr_info.sender_address = Some(source);
        dspr_info.current_sender_address = Some(source);
        dspr_info.current_receiver_address = Some(next_hop);

        let own_position = self.oracle.current_position(self.node);
        let within_ground_range = match (own_position, dest_position) {
            (Some(own), Some(dest)) => own.distance(&dest) <= self.config.ground_station_range,
            _ => false,
        };

        let interface_name = if within_ground_range {
            if self.in_window(packet.creation_time) {
                let hops = self.config.time_to_live.saturating_sub(packet.hop_limit) + 1;
                self.signals.emit(Observation::HopCount(hops));
            }
            debug!(
                "node {}: ground station within range, switching to the air-to-ground link",
                self.node
            );
            &self.config.a2g_output_interface
        } else {
            debug!("node {}: transmitting through the air-to-air link", self.node);
            &self.config.output_interface
        };

        let interface = self
            .selector
            .egress_id(interface_name)
            .ok_or_else(|| DsprError::UnknownInterface(interface_name.clone()))?;
        packet.interface_tag = Some(interface);
        Ok(Decision::Accept)
    }

    pub fn handle_start_operation(&self) {
        debug!("node {}: routing started", self.node);
    }

    pub async fn handle_stop_operation(&self) {
        self.manager.write().await.deregister_client(self.node);
        info!(
            "node {}: total packets received at this node: {}",
            self.node,
            self.packets_received()
        );
    }

    pub async fn handle_crash_operation(&self) {
        self.manager.write().await.deregister_client(self.node);
        info!(
            "node {}: total packets received at this node: {}",
            self.node,
            self.packets_received()
        );
    }

    /// Link-break events arrive from the route authority. The topology
    /// heals at the next periodic rebuild; the break is only recorded here.
    pub fn handle_link_broken(&self, a: Address, b: Address) {
        self.link_breaks.fetch_add(1, Ordering::Relaxed);
        warn!(
            "node {}: link break reported between {} and {}",
            self.node, a, b
        );
    }
}
