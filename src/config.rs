use crate::Address;
use crate::clock::SimTime;
use crate::geometry::Coord;
use crate::metrics::RecordingWindow;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsprConfig {
    /// Nominal air-to-air radio range in meters.
    pub communication_range: f64,
    /// Air-to-ground range in meters; ground-station links reach further.
    pub ground_station_range: f64,
    /// Safety margin applied to the nominal air-to-air range.
    pub usable_communication_range_ratio: f64,
    /// Route recomputation period in seconds.
    pub route_update_interval: f64,
    pub start_recording_time: SimTime,
    /// -1 means no upper bound.
    pub stop_recording_time: SimTime,
    /// Initial hop budget; hop counts are derived from the remaining budget.
    pub time_to_live: u32,
    /// Ground-station addresses. When non-empty only destination-bound routes
    /// are computed.
    pub destination_addresses: Vec<Address>,
    pub output_interface: String,
    pub a2g_output_interface: String,
    pub display_bubbles: bool,
}

impl Default for DsprConfig {
    fn default() -> Self {
        Self {
            communication_range: 370_400.0, // 200 NM
            ground_station_range: 370_400.0,
            usable_communication_range_ratio: 0.8,
            route_update_interval: 1.0,
            start_recording_time: 0.0,
            stop_recording_time: -1.0,
            time_to_live: 32,
            destination_addresses: Vec::new(),
            output_interface: "wlan0".to_string(),
            a2g_output_interface: "a2g0".to_string(),
            display_bubbles: false,
        }
    }
}

impl DsprConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: DsprConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs_f64(self.route_update_interval)
    }

    pub fn recording_window(&self) -> RecordingWindow {
        RecordingWindow::new(self.start_recording_time, self.stop_recording_time)
    }
}

/// One node of a scenario file: where it starts and how it moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub address: Address,
    pub position: Coord,
    #[serde(default)]
    pub velocity: Coord,
}

/// A complete simulation scenario: protocol parameters plus the node fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub config: DsprConfig,
    pub nodes: Vec<NodeSpec>,
}

impl ScenarioConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let scenario: ScenarioConfig = serde_json::from_str(&content)?;
        Ok(scenario)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
