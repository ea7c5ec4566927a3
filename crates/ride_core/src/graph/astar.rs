//! A* search over a [`SpatialGraph`].
//!
//! The open set is a binary min-heap keyed by `f = g + h`, where `g` is the
//! accumulated dynamic edge weight and `h` the (scaled) Haversine distance to the
//! target. Entries with equal `f` pop in insertion order. A node's cost is only
//! replaced by a strictly smaller one, and the search stops the first time the
//! target is popped, which is optimal whenever the heuristic is admissible and
//! consistent for the graph's weight units.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use serde::Serialize;

use super::SpatialGraph;
use crate::geo::Location;

/// Outcome of a shortest-path query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    /// Nodes from start to end inclusive; empty when no path exists.
    pub path: Vec<Location>,
    /// Total dynamic cost; `f64::INFINITY` when no path exists.
    pub cost: f64,
}

impl PathResult {
    pub fn unreachable() -> Self {
        Self {
            path: Vec::new(),
            cost: f64::INFINITY,
        }
    }

    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    priority: f64,
    seq: u64,
    cost: f64,
    node: Location,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on both keys: BinaryHeap is a max-heap and we want the lowest
        // priority first, then the earliest insertion.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub(super) fn search(graph: &SpatialGraph, start: Location, end: Location) -> PathResult {
    let adjacency = graph.adjacency.read();

    let mut g_cost: HashMap<Location, f64> = HashMap::new();
    let mut came_from: HashMap<Location, Location> = HashMap::new();
    let mut open = BinaryHeap::new();
    let mut seq = 0_u64;

    g_cost.insert(start, 0.0);
    open.push(OpenEntry {
        priority: 0.0,
        seq,
        cost: 0.0,
        node: start,
    });

    while let Some(OpenEntry { cost, node, .. }) = open.pop() {
        if node == end {
            return PathResult {
                path: reconstruct_path(&came_from, end),
                cost,
            };
        }

        let best = g_cost.get(&node).copied().unwrap_or(f64::INFINITY);
        if cost > best {
            // Superseded by a cheaper entry pushed later.
            continue;
        }

        let Some(neighbors) = adjacency.get(&node) else {
            continue;
        };

        for &(neighbor, base_weight) in neighbors {
            let new_cost = cost + graph.edge_weight(node, neighbor, base_weight);
            let known = g_cost.get(&neighbor).copied().unwrap_or(f64::INFINITY);
            if new_cost < known {
                g_cost.insert(neighbor, new_cost);
                came_from.insert(neighbor, node);
                seq += 1;
                open.push(OpenEntry {
                    priority: new_cost + graph.scaled_heuristic(neighbor, end),
                    seq,
                    cost: new_cost,
                    node: neighbor,
                });
            }
        }
    }

    PathResult::unreachable()
}

fn reconstruct_path(came_from: &HashMap<Location, Location>, end: Location) -> Vec<Location> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;

    const A: Location = Location::new(0.0, 0.0);
    const B: Location = Location::new(0.0, 1.0);
    const C: Location = Location::new(1.0, 1.0);
    const D: Location = Location::new(5.0, 5.0);

    #[test]
    fn chain_graph_path_and_cost() {
        let graph = SpatialGraph::new();
        graph.add_edge(A, B, 5.0, true).unwrap();
        graph.add_edge(B, C, 5.0, true).unwrap();

        let result = graph.shortest_path(A, C);
        assert_eq!(result.path, vec![A, B, C]);
        assert_eq!(result.cost, 10.0);
    }

    #[test]
    fn disconnected_nodes_are_unreachable() {
        let graph = SpatialGraph::new();
        graph.add_edge(A, B, 5.0, true).unwrap();
        graph.add_edge(C, D, 5.0, true).unwrap();

        let result = graph.shortest_path(A, D);
        assert!(result.path.is_empty());
        assert!(result.cost.is_infinite());
        assert!(!result.is_found());
    }

    #[test]
    fn unknown_start_is_unreachable() {
        let graph = SpatialGraph::new();
        graph.add_edge(A, B, 5.0, true).unwrap();
        assert_eq!(graph.shortest_path(D, A), PathResult::unreachable());
    }

    #[test]
    fn start_equals_end() {
        let graph = SpatialGraph::new();
        let result = graph.shortest_path(A, A);
        assert_eq!(result.path, vec![A]);
        assert_eq!(result.cost, 0.0);
    }

    #[test]
    fn traffic_update_reroutes() {
        // Dijkstra mode keeps the heuristic out of the way of small weights.
        let graph = SpatialGraph::with_config(&GraphConfig {
            heuristic_scale: 0.0,
        })
        .unwrap();
        graph.add_edge(A, B, 1.0, true).unwrap();
        graph.add_edge(B, C, 1.0, true).unwrap();
        graph.add_edge(A, C, 3.0, true).unwrap();
        assert_eq!(graph.shortest_path(A, C).path, vec![A, B, C]);

        graph.update_edge_weight(A, B, 10.0, true).unwrap();
        let rerouted = graph.shortest_path(A, C);
        assert_eq!(rerouted.path, vec![A, C]);
        assert_eq!(rerouted.cost, 3.0);
    }

    #[test]
    fn one_way_edge_is_not_traversed_backwards() {
        let graph = SpatialGraph::new();
        graph.add_edge(A, B, 1.0, false).unwrap();
        assert!(graph.shortest_path(A, B).is_found());
        assert!(!graph.shortest_path(B, A).is_found());
    }

    #[test]
    fn equal_priorities_pop_in_insertion_order() {
        let first = OpenEntry {
            priority: 1.0,
            seq: 1,
            cost: 0.0,
            node: A,
        };
        let second = OpenEntry {
            priority: 1.0,
            seq: 2,
            cost: 0.0,
            node: B,
        };
        let mut open = BinaryHeap::new();
        open.push(second);
        open.push(first);
        assert_eq!(open.pop().map(|e| e.node), Some(A));
        assert_eq!(open.pop().map(|e| e.node), Some(B));
    }

    #[test]
    fn equal_cost_paths_keep_the_first_discovered_parent() {
        let graph = SpatialGraph::with_config(&GraphConfig {
            heuristic_scale: 0.0,
        })
        .unwrap();
        let left = Location::new(0.0, 2.0);
        let right = Location::new(0.0, 3.0);
        let target = Location::new(0.0, 4.0);
        graph.add_edge(A, left, 1.0, false).unwrap();
        graph.add_edge(A, right, 1.0, false).unwrap();
        graph.add_edge(left, target, 1.0, false).unwrap();
        graph.add_edge(right, target, 1.0, false).unwrap();

        let result = graph.shortest_path(A, target);
        assert_eq!(result.path, vec![A, left, target]);
        assert_eq!(result.cost, 2.0);
    }
}
