#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ride_core::geo::Location;
use ride_core::graph::SpatialGraph;

/// Directed edge list over node indices with integer weights.
pub struct RandomGraph {
    pub nodes: Vec<Location>,
    pub edges: Vec<(usize, usize, u64)>,
}

impl RandomGraph {
    /// Scatter `node_count` points over a ~20 km box and connect random pairs.
    ///
    /// Every weight is at least the Haversine length of its edge, so the
    /// kilometre heuristic stays admissible.
    pub fn generate(seed: u64, node_count: usize, edge_count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let nodes: Vec<Location> = (0..node_count)
            .map(|_| {
                Location::new(
                    40.60 + rng.gen_range(0.0..0.18),
                    -74.10 + rng.gen_range(0.0..0.24),
                )
            })
            .collect();
        let edges = (0..edge_count)
            .map(|_| {
                let from = rng.gen_range(0..node_count);
                let to = rng.gen_range(0..node_count);
                let floor = nodes[from].distance_km(&nodes[to]).ceil() as u64;
                (from, to, floor + rng.gen_range(0..5))
            })
            .collect();
        Self { nodes, edges }
    }

    pub fn to_spatial_graph(&self) -> SpatialGraph {
        let graph = SpatialGraph::new();
        for &(from, to, weight) in &self.edges {
            graph
                .add_edge(self.nodes[from], self.nodes[to], weight as f64, false)
                .expect("valid weight");
        }
        graph
    }

    /// Outgoing `(node, weight)` pairs, last edge wins for duplicate pairs
    /// the same way `add_edge` overwrites the traffic table.
    pub fn successors(&self, node: usize) -> Vec<(usize, u64)> {
        let mut out: Vec<(usize, u64)> = Vec::new();
        for &(from, to, weight) in &self.edges {
            if from != node {
                continue;
            }
            match out.iter_mut().find(|(n, _)| *n == to) {
                Some(existing) => existing.1 = weight,
                None => out.push((to, weight)),
            }
        }
        out
    }
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
