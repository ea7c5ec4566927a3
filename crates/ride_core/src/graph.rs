//! Weighted location graph with live traffic overrides.
//!
//! Each directed edge has a **base weight**, fixed when the edge is added, and a
//! **dynamic weight** that starts out equal to the base weight and is overwritten
//! by traffic updates. The dynamic-weight map may be sparse: an absent entry means
//! "use the base weight".
//!
//! The graph is designed to be shared behind an `Arc` between request handlers
//! and traffic feeds. Adjacency and dynamic weights sit behind separate locks so
//! weight updates never wait for a shortest-path search to finish. A search in
//! progress reads each edge's weight when it relaxes that edge, so it may observe
//! a mix of old and new weights.

mod astar;

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{trace, warn};

use crate::config::GraphConfig;
use crate::geo::{haversine_km, Location};

pub use astar::PathResult;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("edge weight {weight} for {from} -> {to} must be finite and non-negative")]
    InvalidWeight {
        from: Location,
        to: Location,
        weight: f64,
    },
    #[error("heuristic scale {0} must be finite and non-negative")]
    InvalidHeuristicScale(f64),
}

/// Outgoing edges keyed by their source location, as `(neighbor, base_weight)`.
type Adjacency = HashMap<Location, Vec<(Location, f64)>>;

#[derive(Debug)]
pub struct SpatialGraph {
    adjacency: RwLock<Adjacency>,
    traffic: RwLock<HashMap<(Location, Location), f64>>,
    heuristic_scale: f64,
}

impl SpatialGraph {
    /// Empty graph whose A* heuristic is the plain Haversine distance in km.
    pub fn new() -> Self {
        Self::with_scale(GraphConfig::default().heuristic_scale)
    }

    /// Empty graph using `config.heuristic_scale`; NaN, infinite or negative
    /// scales are rejected.
    pub fn with_config(config: &GraphConfig) -> Result<Self, GraphError> {
        let scale = config.heuristic_scale;
        if !scale.is_finite() || scale < 0.0 {
            return Err(GraphError::InvalidHeuristicScale(scale));
        }
        Ok(Self::with_scale(scale))
    }

    fn with_scale(heuristic_scale: f64) -> Self {
        Self {
            adjacency: RwLock::new(HashMap::new()),
            traffic: RwLock::new(HashMap::new()),
            heuristic_scale,
        }
    }

    /// Weight units per kilometre applied to the heuristic during A*.
    pub fn heuristic_scale(&self) -> f64 {
        self.heuristic_scale
    }

    /// Add `a -> b` (and `b -> a` when `bidirectional`) with the given base weight.
    ///
    /// The dynamic weight of every inserted direction is reset to `base_weight`.
    /// Adding the same ordered pair twice appends a second adjacency entry; callers
    /// that need idempotence must avoid redundant calls.
    pub fn add_edge(
        &self,
        a: Location,
        b: Location,
        base_weight: f64,
        bidirectional: bool,
    ) -> Result<(), GraphError> {
        validate_weight(a, b, base_weight)?;

        {
            let mut traffic = self.traffic.write();
            traffic.insert((a, b), base_weight);
            if bidirectional {
                traffic.insert((b, a), base_weight);
            }
        }

        let mut adjacency = self.adjacency.write();
        adjacency.entry(a).or_default().push((b, base_weight));
        if bidirectional {
            adjacency.entry(b).or_default().push((a, base_weight));
        }
        Ok(())
    }

    /// Overwrite the dynamic weight of `a -> b` (and `b -> a` when `bidirectional`).
    ///
    /// Directions that were never added are left alone; traffic updates may arrive
    /// before the edge itself. Returns how many directions were updated.
    pub fn update_edge_weight(
        &self,
        a: Location,
        b: Location,
        new_weight: f64,
        bidirectional: bool,
    ) -> Result<usize, GraphError> {
        validate_weight(a, b, new_weight)?;

        let mut traffic = self.traffic.write();
        let mut updated = 0;
        let mut apply = |from: Location, to: Location| match traffic.get_mut(&(from, to)) {
            Some(weight) => {
                *weight = new_weight;
                updated += 1;
            }
            None => warn!(%from, %to, "ignoring traffic update for unknown edge"),
        };

        apply(a, b);
        if bidirectional {
            apply(b, a);
        }
        trace!(%a, %b, new_weight, updated, "edge weight updated");
        Ok(updated)
    }

    /// Dynamic weight of `a -> b`, or `fallback` when none is recorded.
    pub fn edge_weight(&self, a: Location, b: Location, fallback: f64) -> f64 {
        self.traffic.read().get(&(a, b)).copied().unwrap_or(fallback)
    }

    /// Straight-line (Haversine) distance between two locations in kilometres.
    pub fn heuristic(&self, a: Location, b: Location) -> f64 {
        haversine_km(a, b)
    }

    /// A* search from `start` to `end` over dynamic edge weights.
    pub fn shortest_path(&self, start: Location, end: Location) -> PathResult {
        astar::search(self, start, end)
    }

    /// Outgoing `(neighbor, base_weight)` entries of `node`, duplicates included.
    pub fn neighbors(&self, node: Location) -> Vec<(Location, f64)> {
        self.adjacency
            .read()
            .get(&node)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of locations with at least one outgoing edge.
    pub fn node_count(&self) -> usize {
        self.adjacency.read().len()
    }

    /// Number of adjacency entries, counting duplicates and both directions.
    pub fn edge_count(&self) -> usize {
        self.adjacency.read().values().map(Vec::len).sum()
    }

    fn scaled_heuristic(&self, a: Location, b: Location) -> f64 {
        if self.heuristic_scale == 0.0 {
            return 0.0;
        }
        self.heuristic(a, b) * self.heuristic_scale
    }
}

impl Default for SpatialGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_weight(from: Location, to: Location, weight: f64) -> Result<(), GraphError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(GraphError::InvalidWeight { from, to, weight })
    }
}
