use crate::clock::SimTime;
use log::debug;
use std::sync::Mutex;

/// Time interval during which observations are emitted. A negative stop time
/// means no upper bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordingWindow {
    start: SimTime,
    stop: SimTime,
}

impl RecordingWindow {
    pub fn new(start: SimTime, stop: SimTime) -> Self {
        Self { start, stop }
    }

    pub fn contains(&self, t: SimTime) -> bool {
        t >= self.start && (t <= self.stop || self.stop == -1.0)
    }
}

/// One named observation, mirroring the protocol's emitted signals.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    /// Hops consumed by a packet that reached ground-station range.
    HopCount(u32),
    /// A packet was dropped for lack of a route, at this simulated time.
    RoutingFailed(SimTime),
    /// Composite node-index + sequence identity of a locally originated packet.
    PacketIdSent(f64),
    /// Composite identity read back at the destination.
    PacketIdReceived(f64),
}

impl Observation {
    pub fn name(&self) -> &'static str {
        match self {
            Observation::HopCount(_) => "hopCount",
            Observation::RoutingFailed(_) => "routingFailed",
            Observation::PacketIdSent(_) => "packetIdSent",
            Observation::PacketIdReceived(_) => "packetIdReceived",
        }
    }
}

/// Collects emitted observations for scenario reporting and tests.
#[derive(Debug, Default)]
pub struct SignalRecorder {
    observations: Mutex<Vec<Observation>>,
}

impl SignalRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, observation: Observation) {
        debug!("signal {}: {:?}", observation.name(), observation);
        self.observations.lock().unwrap().push(observation);
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.observations.lock().unwrap().clone()
    }

    pub fn count_of(&self, name: &str) -> usize {
        self.observations
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.name() == name)
            .count()
    }
}
