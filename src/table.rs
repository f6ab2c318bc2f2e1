use crate::Address;
use crate::algorithms::{DijkstraAllPairsOutput, UNREACHABLE};
use std::collections::HashMap;

/// One flattened route: source, destination, the immediate neighbor to
/// forward to, and the total hop count of the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub source: Address,
    pub destination: Address,
    pub next_hop: Address,
    pub hop_count: u32,
}

/// Queryable (source, destination) -> next-hop mapping, rebuilt from scratch
/// on every recomputation cycle and swapped in whole. Lookups never mutate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    entries: HashMap<(Address, Address), RouteEntry>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens an all-pairs output into tuple form. Pairs without a finite
    /// path produce no entry.
    pub fn from_all_pairs(output: &DijkstraAllPairsOutput, addresses: &[Address]) -> Self {
        let mut table = Self::new();
        for (i, source) in addresses.iter().enumerate() {
            for (j, destination) in addresses.iter().enumerate() {
                if i == j || output.distances[i][j] == UNREACHABLE {
                    continue;
                }
                if let Some(next_hop) = output.next_hops[i][j] {
                    table.add_route(RouteEntry {
                        source: *source,
                        destination: *destination,
                        next_hop,
                        hop_count: output.distances[i][j],
                    });
                }
            }
        }
        table
    }

    pub fn add_route(&mut self, entry: RouteEntry) {
        self.entries
            .insert((entry.source, entry.destination), entry);
    }

    pub fn get(&self, source: &Address, destination: &Address) -> Option<&RouteEntry> {
        self.entries.get(&(*source, *destination))
    }

    pub fn find_next_hop(&self, source: &Address, destination: &Address) -> Option<Address> {
        self.get(source, destination).map(|entry| entry.next_hop)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::find_all_shortest_paths;

    fn addrs(n: usize) -> Vec<Address> {
        (0..n).map(|i| Address::new(10, 0, 0, (i + 1) as u8)).collect()
    }

    #[test]
    fn test_flatten_line_topology() {
        let adjacency = vec![vec![0, 1, 0], vec![1, 0, 1], vec![0, 1, 0]];
        let addresses = addrs(3);
        let output = find_all_shortest_paths(&adjacency, &addresses);
        let table = RoutingTable::from_all_pairs(&output, &addresses);

        // every ordered reachable pair gets exactly one entry
        assert_eq!(table.len(), 6);

        let entry = table.get(&addresses[0], &addresses[2]).unwrap();
        assert_eq!(entry.next_hop, addresses[1]);
        assert_eq!(entry.hop_count, 2);

        assert_eq!(
            table.find_next_hop(&addresses[0], &addresses[1]),
            Some(addresses[1])
        );
    }

    #[test]
    fn test_unreachable_pairs_have_no_entry() {
        let adjacency = vec![vec![0, 1, 0], vec![1, 0, 0], vec![0, 0, 0]];
        let addresses = addrs(3);
        let output = find_all_shortest_paths(&adjacency, &addresses);
        let table = RoutingTable::from_all_pairs(&output, &addresses);

        assert_eq!(table.find_next_hop(&addresses[0], &addresses[2]), None);
        assert_eq!(table.find_next_hop(&addresses[2], &addresses[0]), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_lookup_of_unknown_endpoints_is_none() {
        let table = RoutingTable::new();
        let a = Address::new(10, 0, 0, 1);
        let b = Address::new(10, 0, 0, 2);
        assert_eq!(table.find_next_hop(&a, &b), None);
    }
}
