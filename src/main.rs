use aero_dspr::clock::{Clock, SimClock};
use aero_dspr::config::{DsprConfig, NodeSpec, ScenarioConfig};
use aero_dspr::forwarding::{Decision, Dspr};
use aero_dspr::geometry::Coord;
use aero_dspr::interfaces::InterfaceSelector;
use aero_dspr::manager::NodeManager;
use aero_dspr::metrics::SignalRecorder;
use aero_dspr::mobility::LinearMobility;
use aero_dspr::packet::{NetworkHeader, Packet};
use aero_dspr::{Address, SharedNodeManager, runtime};
use anyhow::{Result, bail};
use clap::Parser;
use log::{info, warn};
use std::sync::Arc;
use tokio::runtime::Builder;
use tokio::sync::RwLock;

#[derive(Parser)]
#[command(name = "aero-dspr")]
struct Cli {
    /// Scenario file (JSON); a built-in multi-hop demo runs without one
    #[arg(long)]
    scenario: Option<String>,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 10.0)]
    duration: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let scenario = match &cli.scenario {
        Some(path) => ScenarioConfig::load(path)?,
        None => demo_scenario(),
    };

    let rt = Builder::new_multi_thread().enable_all().build()?;
    rt.block_on(run(scenario, cli.duration))
}

/// Three aircraft in a line plus one ground station. Only the aircraft
/// closest to the station has it in air-to-ground range, so traffic from the
/// far end crosses the whole chain.
fn demo_scenario() -> ScenarioConfig {
    let ground_station = Address::new(10, 0, 0, 100);
    let config = DsprConfig {
        communication_range: 20_000.0,
        usable_communication_range_ratio: 0.8,
        ground_station_range: 20_000.0,
        destination_addresses: vec![ground_station],
        ..DsprConfig::default()
    };

    let nodes = vec![
        NodeSpec {
            address: Address::new(10, 0, 0, 1),
            position: Coord::new(0.0, 0.0, 9_000.0),
            velocity: Coord::new(120.0, 0.0, 0.0),
        },
        NodeSpec {
            address: Address::new(10, 0, 0, 2),
            position: Coord::new(15_000.0, 0.0, 9_000.0),
            velocity: Coord::new(100.0, 0.0, 0.0),
        },
        NodeSpec {
            address: Address::new(10, 0, 0, 3),
            position: Coord::new(30_000.0, 0.0, 9_000.0),
            velocity: Coord::new(80.0, 0.0, 0.0),
        },
        NodeSpec {
            address: ground_station,
            position: Coord::new(45_000.0, 0.0, 0.0),
            velocity: Coord::default(),
        },
    ];

    ScenarioConfig { config, nodes }
}

async fn run(scenario: ScenarioConfig, duration: f64) -> Result<()> {
    if scenario.nodes.is_empty() {
        bail!("scenario has no nodes");
    }

    let clock = Arc::new(SimClock::new());
    let mobility = Arc::new(LinearMobility::new(clock.clone()));
    for (i, node) in scenario.nodes.iter().enumerate() {
        mobility.add_track(i, node.position, node.velocity);
    }

    let signals = Arc::new(SignalRecorder::new());
    let manager: SharedNodeManager = Arc::new(RwLock::new(NodeManager::new(
        scenario.config.clone(),
        mobility.clone(),
    )));

    let mut selector = InterfaceSelector::new();
    selector.add(&scenario.config.output_interface, 1);
    selector.add(&scenario.config.a2g_output_interface, 2);

    let mut forwarders = Vec::new();
    {
        let mut guard = manager.write().await;
        for (i, node) in scenario.nodes.iter().enumerate() {
            guard.register_client(i, node.address);
        }
    }
    for (i, node) in scenario.nodes.iter().enumerate() {
        let dspr = Arc::new(Dspr::new(
            i,
            node.address,
            manager.clone(),
            mobility.clone(),
            clock.clone(),
            signals.clone(),
            selector.clone(),
            scenario.config.clone(),
        ));
        dspr.handle_start_operation();
        manager.write().await.attach_forwarder(&dspr);
        forwarders.push(dspr);
    }

    let dest_address = scenario
        .config
        .destination_addresses
        .first()
        .copied()
        .unwrap_or(scenario.nodes[scenario.nodes.len() - 1].address);
    info!(
        "running {} nodes for {} simulated seconds, destination {}",
        scenario.nodes.len(),
        duration,
        dest_address
    );

    let tasks = runtime::start_tasks(manager.clone(), scenario.config.update_interval());

    let dt = scenario.config.route_update_interval;
    let mut timer = tokio::time::interval(scenario.config.update_interval());
    while clock.now() < duration {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                break;
            }
            _ = timer.tick() => {
                clock.advance(dt);
                originate_traffic(&forwarders, dest_address, &scenario.config, clock.as_ref()).await;
            }
        }
    }

    tasks.shutdown().await;

    for dspr in &forwarders {
        dspr.handle_stop_operation().await;
    }
    report(&signals);
    Ok(())
}

/// One packet per aircraft toward the destination, each cycle, walked hop
/// by hop through the forwarding components until delivery or drop.
async fn originate_traffic(
    forwarders: &[Arc<Dspr>],
    dest_address: Address,
    config: &DsprConfig,
    clock: &dyn Clock,
) {
    for dspr in forwarders {
        if dspr.self_address() == dest_address {
            continue;
        }
        walk_packet(forwarders, dspr, dest_address, config, clock).await;
    }
}

async fn walk_packet(
    forwarders: &[Arc<Dspr>],
    origin: &Arc<Dspr>,
    dest_address: Address,
    config: &DsprConfig,
    clock: &dyn Clock,
) {
    let header = NetworkHeader::fixed(origin.self_address(), dest_address);
    let mut packet = Packet::new(header, config.time_to_live, Some(clock.now()));

    let mut decision = match origin.datagram_local_out_hook(&mut packet).await {
        Ok(decision) => decision,
        Err(e) => {
            warn!("t={:.0}s node {}: {}", clock.now(), origin.node(), e);
            return;
        }
    };

    loop {
        if decision == Decision::Drop {
            warn!(
                "t={:.0}s {} -> {}: dropped, no route",
                clock.now(),
                origin.self_address(),
                dest_address
            );
            return;
        }
        let Some(next_hop) = packet.next_hop_tag else {
            // locally delivered or bypassed routing entirely
            return;
        };
        if packet.hop_limit == 0 {
            warn!(
                "t={:.0}s {} -> {}: hop budget exhausted",
                clock.now(),
                origin.self_address(),
                dest_address
            );
            return;
        }
        packet.hop_limit -= 1;

        let Some(receiver) = forwarders.iter().find(|d| d.self_address() == next_hop) else {
            warn!("t={:.0}s no component for next hop {}", clock.now(), next_hop);
            return;
        };

        if next_hop == dest_address {
            receiver.datagram_local_in_hook(&packet);
            info!(
                "t={:.0}s {} -> {}: delivered in {} hops",
                clock.now(),
                origin.self_address(),
                dest_address,
                config.time_to_live - packet.hop_limit
            );
            return;
        }

        decision = match receiver.datagram_pre_routing_hook(&mut packet).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!("t={:.0}s node {}: {}", clock.now(), receiver.node(), e);
                return;
            }
        };
    }
}

fn report(signals: &SignalRecorder) {
    info!("--- signal summary ---");
    for name in [
        "packetIdSent",
        "packetIdReceived",
        "hopCount",
        "routingFailed",
    ] {
        info!("{}: {}", name, signals.count_of(name));
    }
}
