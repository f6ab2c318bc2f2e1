use crate::Address;
use crate::graph::AdjacencyMatrix;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Distance recorded for a pair with no path between them.
pub const UNREACHABLE: u32 = u32::MAX;

/// All-pairs result. `distances[i][j]` is the minimum hop count from i to j
/// (`UNREACHABLE` when no path exists, 0 on the diagonal); `next_hops[i][j]`
/// is the immediate neighbor of i on the shortest path toward j, `None` for
/// self and unreachable pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DijkstraAllPairsOutput {
    pub distances: Vec<Vec<u32>>,
    pub next_hops: Vec<Vec<Option<Address>>>,
}

impl DijkstraAllPairsOutput {
    fn sentinel(n: usize) -> Self {
        let mut output = Self {
            distances: vec![vec![UNREACHABLE; n]; n],
            next_hops: vec![vec![None; n]; n],
        };
        for i in 0..n {
            output.distances[i][i] = 0;
        }
        output
    }
}

#[derive(Debug)]
struct State {
    cost: u32,
    vertex: usize,
}

impl Eq for State {}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.vertex == other.vertex
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; equal costs pop in index order so
        // tie-breaking is deterministic.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source pass over the adjacency matrix. Returns per-vertex distance
/// and predecessor on the shortest path from `source`.
fn single_source(adjacency: &AdjacencyMatrix, source: usize) -> (Vec<u32>, Vec<Option<usize>>) {
    let n = adjacency.len();
    let mut distances = vec![UNREACHABLE; n];
    let mut previous: Vec<Option<usize>> = vec![None; n];
    let mut heap = BinaryHeap::new();

    distances[source] = 0;
    heap.push(State {
        cost: 0,
        vertex: source,
    });

    while let Some(State { cost, vertex }) = heap.pop() {
        // Skip if we've already found a better path
        if cost > distances[vertex] {
            continue;
        }

        for neighbor in 0..n {
            if adjacency[vertex][neighbor] == 0 {
                continue;
            }
            let new_cost = cost + 1;
            if new_cost < distances[neighbor] {
                distances[neighbor] = new_cost;
                previous[neighbor] = Some(vertex);
                heap.push(State {
                    cost: new_cost,
                    vertex: neighbor,
                });
            }
        }
    }

    (distances, previous)
}

/// First vertex after `source` on the shortest path to `dest`, recovered by
/// walking the predecessor chain back from the destination.
fn first_hop(previous: &[Option<usize>], source: usize, dest: usize) -> Option<usize> {
    if dest == source {
        return None;
    }
    let mut current = dest;
    while let Some(prev) = previous[current] {
        if prev == source {
            return Some(current);
        }
        current = prev;
    }
    None
}

/// All-pairs shortest paths: one single-source run per vertex. Unit edge
/// weights, so distances are hop counts. Absence of a path is recorded with
/// the sentinel, never reported as an error.
pub fn find_all_shortest_paths(
    adjacency: &AdjacencyMatrix,
    addresses: &[Address],
) -> DijkstraAllPairsOutput {
    let n = adjacency.len();
    debug_assert_eq!(n, addresses.len());
    let mut output = DijkstraAllPairsOutput::sentinel(n);

    for source in 0..n {
        let (distances, previous) = single_source(adjacency, source);
        for dest in 0..n {
            if distances[dest] == UNREACHABLE {
                continue;
            }
            output.distances[source][dest] = distances[dest];
            output.next_hops[source][dest] =
                first_hop(&previous, source, dest).map(|hop| addresses[hop]);
        }
    }

    output
}

/// Destination-restricted variant: only columns belonging to the given
/// destination set are computed, with one single-source run per destination.
/// The graph is undirected, so the tree rooted at a destination yields, for
/// every vertex, both its distance and its predecessor — which is exactly the
/// first hop on that vertex's path toward the destination. A destination that
/// is not in the active set keeps its sentinel column.
pub fn find_all_shortest_paths_to_destination(
    adjacency: &AdjacencyMatrix,
    addresses: &[Address],
    destination_addresses: &[Address],
) -> DijkstraAllPairsOutput {
    let n = adjacency.len();
    debug_assert_eq!(n, addresses.len());
    let mut output = DijkstraAllPairsOutput::sentinel(n);

    for dest_address in destination_addresses {
        let Some(dest) = addresses.iter().position(|a| a == dest_address) else {
            continue;
        };
        let (distances, previous) = single_source(adjacency, dest);
        for source in 0..n {
            if source == dest || distances[source] == UNREACHABLE {
                continue;
            }
            output.distances[source][dest] = distances[source];
            output.next_hops[source][dest] = previous[source].map(|hop| addresses[hop]);
        }
    }

    output
}
