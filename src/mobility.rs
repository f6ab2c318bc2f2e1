use crate::NodeId;
use crate::clock::Clock;
use crate::geometry::Coord;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Supplies the current position of a node on demand. Positions are queried
/// fresh on every recomputation cycle and every forwarding decision, never
/// cached by the callers.
pub trait PositionOracle: Send + Sync {
    fn current_position(&self, node: NodeId) -> Option<Coord>;
}

/// Fixed positions, settable at any time. Used for ground stations and tests.
#[derive(Default)]
pub struct StaticPositions {
    positions: Mutex<HashMap<NodeId, Coord>>,
}

impl StaticPositions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, node: NodeId, position: Coord) {
        self.positions.lock().unwrap().insert(node, position);
    }

    pub fn remove(&self, node: NodeId) {
        self.positions.lock().unwrap().remove(&node);
    }
}

impl PositionOracle for StaticPositions {
    fn current_position(&self, node: NodeId) -> Option<Coord> {
        self.positions.lock().unwrap().get(&node).copied()
    }
}

struct Track {
    start: Coord,
    velocity: Coord,
}

/// Straight-line constant-velocity tracks; position is derived from the
/// clock at query time, so movement needs no per-tick update.
pub struct LinearMobility {
    clock: Arc<dyn Clock>,
    tracks: Mutex<HashMap<NodeId, Track>>,
}

impl LinearMobility {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            tracks: Mutex::new(HashMap::new()),
        }
    }

    pub fn add_track(&self, node: NodeId, start: Coord, velocity: Coord) {
        self.tracks
            .lock()
            .unwrap()
            .insert(node, Track { start, velocity });
    }
}

impl PositionOracle for LinearMobility {
    fn current_position(&self, node: NodeId) -> Option<Coord> {
        let t = self.clock.now();
        let tracks = self.tracks.lock().unwrap();
        tracks.get(&node).map(|track| {
            Coord::new(
                track.start.x + track.velocity.x * t,
                track.start.y + track.velocity.y * t,
                track.start.z + track.velocity.z * t,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;

    #[test]
    fn test_static_positions_set_and_query() {
        let oracle = StaticPositions::new();
        oracle.set(3, Coord::new(1.0, 2.0, 3.0));
        assert_eq!(oracle.current_position(3), Some(Coord::new(1.0, 2.0, 3.0)));
        assert_eq!(oracle.current_position(4), None);
        oracle.remove(3);
        assert_eq!(oracle.current_position(3), None);
    }

    #[test]
    fn test_linear_mobility_follows_clock() {
        let clock = Arc::new(SimClock::new());
        let mobility = LinearMobility::new(clock.clone());
        mobility.add_track(0, Coord::new(100.0, 0.0, 9000.0), Coord::new(10.0, -5.0, 0.0));

        assert_eq!(
            mobility.current_position(0),
            Some(Coord::new(100.0, 0.0, 9000.0))
        );

        clock.advance(2.0);
        assert_eq!(
            mobility.current_position(0),
            Some(Coord::new(120.0, -10.0, 9000.0))
        );
        assert_eq!(mobility.current_position(1), None);
    }
}
