//! JSON scenario files: one rider, the drivers around them, past ratings and a
//! road graph with optional traffic overrides.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ride_core::config::GraphConfig;
use ride_core::geo::Location;
use ride_core::graph::{GraphError, SpatialGraph};
use ride_core::matching::{DriverCandidate, DriverId, Rider, RiderId};
use ride_core::rating::{InMemoryRatingStore, RatingError};
use ride_core::store::InMemoryDriverStore;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub rider: Rider,
    #[serde(default)]
    pub drivers: Vec<DriverCandidate>,
    #[serde(default)]
    pub ratings: Vec<ScenarioRating>,
    #[serde(default)]
    pub edges: Vec<ScenarioEdge>,
    /// Applied on top of `edges` as live weight updates.
    #[serde(default)]
    pub traffic: Vec<ScenarioEdge>,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioRating {
    pub rider_id: RiderId,
    pub driver_id: DriverId,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioEdge {
    pub from: Location,
    pub to: Location,
    pub weight: f64,
    /// Both directions unless the row says otherwise.
    #[serde(default = "default_bidirectional")]
    pub bidirectional: bool,
}

fn default_bidirectional() -> bool {
    true
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    pub fn graph(&self, config: &GraphConfig) -> Result<SpatialGraph, GraphError> {
        let graph = SpatialGraph::with_config(config)?;
        for edge in &self.edges {
            graph.add_edge(edge.from, edge.to, edge.weight, edge.bidirectional)?;
        }
        for update in &self.traffic {
            graph.update_edge_weight(update.from, update.to, update.weight, update.bidirectional)?;
        }
        Ok(graph)
    }

    pub fn rating_store(&self) -> Result<InMemoryRatingStore, RatingError> {
        let store = InMemoryRatingStore::new();
        for rating in &self.ratings {
            store.submit(rating.rider_id, rating.driver_id, rating.score)?;
        }
        Ok(store)
    }

    pub fn driver_store(&self) -> InMemoryDriverStore {
        InMemoryDriverStore::from_drivers(self.drivers.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ride_core::rating::RatingLookup;

    const SCENARIO: &str = r#"{
        "rider": { "id": 1, "location": { "lat": 40.7128, "lng": -74.006 },
                   "smoking": false, "music": true, "pets": true },
        "drivers": [
            { "id": 1, "location": { "lat": 40.7138, "lng": -74.005 },
              "smoking": false, "music": true, "pets": true, "rating": 4.5 }
        ],
        "ratings": [
            { "rider_id": 2, "driver_id": 1, "score": 4.0 },
            { "rider_id": 3, "driver_id": 1, "score": 5.0 }
        ],
        "edges": [
            { "from": { "lat": 0.0, "lng": 0.0 }, "to": { "lat": 0.0, "lng": 1.0 },
              "weight": 10.0, "bidirectional": true }
        ],
        "traffic": [
            { "from": { "lat": 0.0, "lng": 0.0 }, "to": { "lat": 0.0, "lng": 1.0 },
              "weight": 25.0, "bidirectional": false }
        ]
    }"#;

    #[test]
    fn builds_stores_and_graph() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).expect("scenario");
        assert_eq!(scenario.rider.id, RiderId(1));
        assert_eq!(scenario.driver_store().len(), 1);
        assert_eq!(
            scenario.rating_store().unwrap().average_rating(DriverId(1)),
            Some(4.5)
        );

        let graph = scenario.graph(&GraphConfig::default()).unwrap();
        let a = Location::new(0.0, 0.0);
        let b = Location::new(0.0, 1.0);
        assert_eq!(graph.edge_weight(a, b, 0.0), 25.0);
        assert_eq!(graph.edge_weight(b, a, 0.0), 10.0);
    }

    #[test]
    fn rows_without_direction_flag_cover_both_directions() {
        let scenario: Scenario = serde_json::from_str(
            r#"{
                "rider": { "id": 1, "location": { "lat": 0.0, "lng": 0.0 } },
                "edges": [
                    { "from": { "lat": 0.0, "lng": 0.0 }, "to": { "lat": 0.0, "lng": 0.01 },
                      "weight": 1.0 }
                ],
                "traffic": [
                    { "from": { "lat": 0.0, "lng": 0.0 }, "to": { "lat": 0.0, "lng": 0.01 },
                      "weight": 4.0 }
                ]
            }"#,
        )
        .expect("scenario");
        assert!(scenario.edges[0].bidirectional);
        assert!(scenario.traffic[0].bidirectional);

        let graph = scenario.graph(&GraphConfig::default()).unwrap();
        let a = Location::new(0.0, 0.0);
        let b = Location::new(0.0, 0.01);
        let back = graph.shortest_path(b, a);
        assert_eq!(back.path, vec![b, a]);
        assert_eq!(back.cost, 4.0);
        assert_eq!(graph.edge_weight(a, b, 0.0), 4.0);
    }

    #[test]
    fn invalid_heuristic_scale_is_rejected() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).expect("scenario");
        let config = GraphConfig {
            heuristic_scale: -1.0,
        };
        assert!(matches!(
            scenario.graph(&config),
            Err(GraphError::InvalidHeuristicScale(_))
        ));
    }

    #[test]
    fn loads_from_disk_and_reports_bad_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = dir.path().join("scenario.json");
        std::fs::write(&good, SCENARIO).expect("write");
        assert_eq!(Scenario::load(&good).expect("load").drivers.len(), 1);

        let bad = dir.path().join("broken.json");
        std::fs::write(&bad, "{").expect("write");
        let err = Scenario::load(&bad).unwrap_err();
        assert!(err.to_string().contains("failed to parse scenario"));
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let mut scenario: Scenario = serde_json::from_str(SCENARIO).expect("scenario");
        scenario.ratings[0].score = 6.0;
        assert_eq!(
            scenario.rating_store().unwrap_err(),
            RatingError::OutOfRange(6.0)
        );
    }
}
