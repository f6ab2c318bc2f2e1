use crate::geometry::Coord;

/// Square connectivity matrix over the active node set. Cell (i, j) is 1 when
/// i and j can talk directly, 0 otherwise. Symmetric, zero diagonal.
pub type AdjacencyMatrix = Vec<Vec<u32>>;

/// Builds the connectivity graph for one recomputation cycle. A pair is
/// connected when its Euclidean distance does not exceed the effective range:
/// `ground_station_range` when one endpoint is the destination index (the
/// ground-station downlink reaches further), otherwise
/// `communication_range * usable_ratio`. The threshold is inclusive.
pub fn build_graph(
    positions: &[Coord],
    communication_range: f64,
    dest_index: Option<usize>,
    ground_station_range: f64,
    usable_ratio: f64,
) -> AdjacencyMatrix {
    let n = positions.len();
    let air_to_air_range = communication_range * usable_ratio;
    let mut adjacency = vec![vec![0u32; n]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let range = if dest_index == Some(i) || dest_index == Some(j) {
                ground_station_range
            } else {
                air_to_air_range
            };
            if positions[i].distance(&positions[j]) <= range {
                adjacency[i][j] = 1;
                adjacency[j][i] = 1;
            }
        }
    }

    adjacency
}
