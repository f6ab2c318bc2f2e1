use aero_dspr::algorithms::{UNREACHABLE, find_all_shortest_paths};
use aero_dspr::clock::SimClock;
use aero_dspr::config::DsprConfig;
use aero_dspr::forwarding::{Decision, Dspr};
use aero_dspr::geometry::Coord;
use aero_dspr::graph::build_graph;
use aero_dspr::interfaces::{InterfaceHandle, InterfaceSelector};
use aero_dspr::manager::NodeManager;
use aero_dspr::metrics::SignalRecorder;
use aero_dspr::mobility::StaticPositions;
use aero_dspr::packet::{NetworkHeader, Packet};
use aero_dspr::{Address, SharedNodeManager};
use std::sync::Arc;
use tokio::sync::RwLock;

fn addr(last: u8) -> Address {
    Address::new(10, 0, 0, last)
}

fn addresses(n: usize) -> Vec<Address> {
    (0..n).map(|i| addr((i + 1) as u8)).collect()
}

#[test]
fn full_mesh_when_every_pair_is_in_range() {
    // all pairwise distances below the effective range 100 * 0.9 = 90
    let positions = vec![
        Coord::new(0.0, 0.0, 0.0),
        Coord::new(30.0, 0.0, 0.0),
        Coord::new(0.0, 40.0, 0.0),
        Coord::new(20.0, 20.0, 0.0),
    ];
    let adjacency = build_graph(&positions, 100.0, None, 0.0, 0.9);
    let output = find_all_shortest_paths(&adjacency, &addresses(4));

    for i in 0..4 {
        for j in 0..4 {
            let expected = u32::from(i != j);
            assert_eq!(output.distances[i][j], expected, "pair ({}, {})", i, j);
        }
    }
}

#[test]
fn cross_cluster_pairs_are_unreachable() {
    // cluster one around x = 0, cluster two around x = 10_000
    let positions = vec![
        Coord::new(0.0, 0.0, 0.0),
        Coord::new(50.0, 0.0, 0.0),
        Coord::new(10_000.0, 0.0, 0.0),
        Coord::new(10_050.0, 0.0, 0.0),
    ];
    let adjacency = build_graph(&positions, 100.0, None, 0.0, 1.0);
    let output = find_all_shortest_paths(&adjacency, &addresses(4));

    assert_eq!(output.distances[0][1], 1);
    assert_eq!(output.distances[2][3], 1);
    for (a, b) in [(0, 2), (0, 3), (1, 2), (1, 3)] {
        assert_eq!(output.distances[a][b], UNREACHABLE);
        assert_eq!(output.distances[b][a], UNREACHABLE);
        assert_eq!(output.next_hops[a][b], None);
    }
}

#[test]
fn boundary_distance_is_connected_epsilon_beyond_is_not() {
    let at_threshold = vec![Coord::new(0.0, 0.0, 0.0), Coord::new(90.0, 0.0, 0.0)];
    let adjacency = build_graph(&at_threshold, 100.0, None, 0.0, 0.9);
    assert_eq!(adjacency[0][1], 1);

    let beyond = vec![Coord::new(0.0, 0.0, 0.0), Coord::new(90.000001, 0.0, 0.0)];
    let adjacency = build_graph(&beyond, 100.0, None, 0.0, 0.9);
    assert_eq!(adjacency[0][1], 0);
}

fn line_manager() -> (NodeManager, Arc<StaticPositions>) {
    // A - B = 10, B - C = 10, A - C = 20, range = 15
    let oracle = Arc::new(StaticPositions::new());
    oracle.set(0, Coord::new(0.0, 0.0, 0.0));
    oracle.set(1, Coord::new(10.0, 0.0, 0.0));
    oracle.set(2, Coord::new(20.0, 0.0, 0.0));

    let config = DsprConfig {
        communication_range: 15.0,
        usable_communication_range_ratio: 1.0,
        ground_station_range: 0.0,
        ..DsprConfig::default()
    };
    let mut manager = NodeManager::new(config, oracle.clone());
    manager.register_client(0, addr(1));
    manager.register_client(1, addr(2));
    manager.register_client(2, addr(3));
    (manager, oracle)
}

#[test]
fn three_nodes_in_a_line_route_through_the_middle() {
    let (mut manager, _oracle) = line_manager();
    manager.recalculate_routes();

    assert_eq!(manager.find_next_hop(&addr(1), &addr(3)), Some(addr(2)));
    let entry = manager.routing_table().get(&addr(1), &addr(3)).unwrap();
    assert_eq!(entry.hop_count, 2);
}

#[test]
fn recalculation_is_idempotent_without_changes() {
    let (mut manager, _oracle) = line_manager();
    manager.recalculate_routes();
    let first = manager.routing_table().clone();
    manager.recalculate_routes();
    assert_eq!(*manager.routing_table(), first);
}

#[test]
fn lookup_round_trips_with_the_all_pairs_output() {
    let (mut manager, _oracle) = line_manager();
    manager.recalculate_routes();

    let active = manager.registry().active_addresses().to_vec();
    let output = manager.all_shortest_paths().clone();
    for (i, source) in active.iter().enumerate() {
        for (j, destination) in active.iter().enumerate() {
            assert_eq!(
                manager.find_next_hop(source, destination),
                output.next_hops[i][j]
            );
        }
    }
}

#[test]
fn deregistered_destination_yields_no_route_after_rebuild() {
    let (mut manager, _oracle) = line_manager();
    manager.recalculate_routes();
    assert_eq!(manager.find_next_hop(&addr(1), &addr(2)), Some(addr(2)));

    manager.deregister_client(1);
    manager.recalculate_routes();

    assert_eq!(manager.find_next_hop(&addr(1), &addr(2)), None);
    assert_eq!(manager.find_next_hop(&addr(1), &addr(3)), None);
}

struct ForwardingWorld {
    manager: SharedNodeManager,
    signals: Arc<SignalRecorder>,
    dspr: Arc<Dspr>,
}

async fn forwarding_world(config: DsprConfig, positions: &[(f64, f64, f64)]) -> ForwardingWorld {
    let oracle = Arc::new(StaticPositions::new());
    for (i, (x, y, z)) in positions.iter().enumerate() {
        oracle.set(i, Coord::new(*x, *y, *z));
    }

    let mut manager = NodeManager::new(config.clone(), oracle.clone());
    for i in 0..positions.len() {
        manager.register_client(i, addr((i + 1) as u8));
    }
    manager.recalculate_routes();
    let manager: SharedNodeManager = Arc::new(RwLock::new(manager));

    let mut selector = InterfaceSelector::new();
    selector.add("wlan0", 1);
    selector.add("a2g0", 2);

    let signals = Arc::new(SignalRecorder::new());
    let dspr = Arc::new(Dspr::new(
        0,
        addr(1),
        manager.clone(),
        oracle,
        Arc::new(SimClock::new()),
        signals.clone(),
        selector,
        config,
    ));
    ForwardingWorld {
        manager,
        signals,
        dspr,
    }
}

#[tokio::test]
async fn ground_station_beyond_air_to_air_range_selects_a2g_interface() {
    // station is 100 away: outside air-to-air range 15, inside A2G range 150
    let config = DsprConfig {
        communication_range: 15.0,
        usable_communication_range_ratio: 1.0,
        ground_station_range: 150.0,
        destination_addresses: vec![addr(2)],
        ..DsprConfig::default()
    };
    let world = forwarding_world(config, &[(0.0, 0.0, 0.0), (100.0, 0.0, 0.0)]).await;

    let mut packet = Packet::new(NetworkHeader::fixed(addr(1), addr(2)), 32, Some(0.0));
    let decision = world.dspr.datagram_local_out_hook(&mut packet).await.unwrap();

    assert_eq!(decision, Decision::Accept);
    assert_eq!(packet.interface_tag, Some(InterfaceHandle(2)));
    assert_eq!(world.signals.count_of("routingFailed"), 0);
    assert_eq!(world.signals.count_of("hopCount"), 1);
}

#[tokio::test]
async fn special_destinations_never_consult_the_routing_table() {
    let config = DsprConfig {
        communication_range: 15.0,
        usable_communication_range_ratio: 1.0,
        ground_station_range: 0.0,
        ..DsprConfig::default()
    };
    // a lone node: its table is empty, so any routed packet would drop
    let world = forwarding_world(config, &[(0.0, 0.0, 0.0)]).await;

    for destination in [Address::new(239, 1, 2, 3), Address::BROADCAST, addr(1)] {
        let mut packet = Packet::new(NetworkHeader::fixed(addr(1), destination), 32, Some(0.0));
        let decision = world.dspr.datagram_local_out_hook(&mut packet).await.unwrap();
        assert_eq!(decision, Decision::Accept);
        assert!(packet.next_hop_tag.is_none());
    }
    assert_eq!(world.signals.count_of("routingFailed"), 0);
}

#[tokio::test]
async fn stale_route_disappears_after_peer_deregisters() {
    let config = DsprConfig {
        communication_range: 15.0,
        usable_communication_range_ratio: 1.0,
        ground_station_range: 0.0,
        ..DsprConfig::default()
    };
    let world = forwarding_world(config, &[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0)]).await;

    let mut packet = Packet::new(NetworkHeader::fixed(addr(1), addr(2)), 32, Some(0.0));
    let decision = world.dspr.datagram_local_out_hook(&mut packet).await.unwrap();
    assert_eq!(decision, Decision::Accept);

    {
        let mut manager = world.manager.write().await;
        manager.deregister_client(1);
        manager.recalculate_routes();
    }

    let mut packet = Packet::new(NetworkHeader::fixed(addr(1), addr(2)), 32, Some(0.0));
    let decision = world.dspr.datagram_local_out_hook(&mut packet).await.unwrap();
    assert_eq!(decision, Decision::Drop);
    assert_eq!(world.signals.count_of("routingFailed"), 1);
}
