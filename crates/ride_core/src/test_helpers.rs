//! Shared fixtures for unit tests, integration tests and benches.
//!
//! Locations sit in lower Manhattan so distances stay in the few-kilometre range
//! the matcher is tuned for.

use crate::eta::EtaProvider;
use crate::geo::Location;
use crate::graph::SpatialGraph;
use crate::matching::{DriverCandidate, DriverId, RidePreferences, Rider, RiderId};

pub const NEW_YORK: Location = Location::new(40.7128, -74.0060);
pub const LOS_ANGELES: Location = Location::new(34.0522, -118.2437);

/// Rider at City Hall who dislikes smoking and wants music and pets.
pub fn sample_rider() -> Rider {
    Rider {
        id: RiderId(1),
        location: NEW_YORK,
        preferences: RidePreferences::new(false, true, true),
    }
}

/// Close driver with identical preferences, rated 4.5.
pub fn nearby_driver() -> DriverCandidate {
    driver(1, Location::new(40.7138, -74.0050))
        .with_preferences(RidePreferences::new(false, true, true))
        .with_rating(4.5)
}

/// Farther driver that shares two preferences, rated 5.0.
pub fn distant_driver() -> DriverCandidate {
    driver(2, Location::new(40.7328, -73.9350))
        .with_preferences(RidePreferences::new(false, true, false))
        .with_rating(5.0)
}

/// Available driver with the sample rider's preferences and default rating.
pub fn driver(id: u64, location: Location) -> DriverCandidate {
    DriverCandidate {
        id: DriverId(id),
        location,
        is_available: true,
        preferences: RidePreferences::new(false, true, true),
        rating: 5.0,
    }
}

impl DriverCandidate {
    pub fn with_preferences(mut self, preferences: RidePreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }
}

/// Rating lookup answering from each candidate's stored `rating` field.
pub fn ratings_from(
    drivers: &[DriverCandidate],
) -> impl Fn(DriverId) -> Option<f64> + Send + Sync {
    let ratings: Vec<(DriverId, f64)> = drivers.iter().map(|d| (d.id, d.rating)).collect();
    move |id: DriverId| ratings.iter().find(|(driver, _)| *driver == id).map(|(_, r)| *r)
}

/// Rating lookup with no recorded ratings.
pub fn no_ratings() -> impl Fn(DriverId) -> Option<f64> + Send + Sync {
    |_: DriverId| -> Option<f64> { None }
}

/// ETA provider that answers `minutes` for every pair.
pub fn fixed_eta(minutes: f64) -> impl EtaProvider {
    move |_: Location, _: Location| Some(minutes)
}

/// ETA provider that always fails.
pub fn failing_eta() -> impl EtaProvider {
    |_: Location, _: Location| -> Option<f64> { None }
}

/// `rows x cols` grid of bidirectional edges spaced `step` degrees apart,
/// each weighted by its Haversine length.
///
/// # Panics
///
/// Panics if `step` makes an edge weight non-finite.
pub fn grid_graph(rows: usize, cols: usize, step: f64) -> SpatialGraph {
    let graph = SpatialGraph::new();
    let at = |r, c| grid_location(r, c, step);
    for r in 0..rows {
        for c in 0..cols {
            let here = at(r, c);
            if c + 1 < cols {
                let right = at(r, c + 1);
                graph
                    .add_edge(here, right, here.distance_km(&right), true)
                    .expect("valid weight");
            }
            if r + 1 < rows {
                let down = at(r + 1, c);
                graph
                    .add_edge(here, down, here.distance_km(&down), true)
                    .expect("valid weight");
            }
        }
    }
    graph
}

/// Node `(row, col)` of [`grid_graph`].
pub fn grid_location(row: usize, col: usize, step: f64) -> Location {
    Location::new(40.70 + row as f64 * step, -74.02 + col as f64 * step)
}
