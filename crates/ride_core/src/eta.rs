//! Travel-time collaborators used to score drivers.
//!
//! The live implementation is the OSRM client ([`crate::osrm::OsrmClient`], feature
//! `osrm`). [`FixedSpeedEta`] estimates from straight-line distance and is used
//! offline and in tests; any `Fn(Location, Location) -> Option<f64>` closure also
//! works as a provider.

use crate::config::DEFAULT_AVG_SPEED_KMH;
use crate::geo::{haversine_km, Location};

/// Source of travel-time estimates between two locations.
///
/// Implementations must be `Send + Sync` so lookups can run on a worker pool.
pub trait EtaProvider: Send + Sync {
    /// Travel time from `from` to `to` in minutes, or `None` if the estimate could
    /// not be obtained. A failure must never be reported as a zero duration.
    fn travel_time_minutes(&self, from: Location, to: Location) -> Option<f64>;
}

impl<F> EtaProvider for F
where
    F: Fn(Location, Location) -> Option<f64> + Send + Sync,
{
    fn travel_time_minutes(&self, from: Location, to: Location) -> Option<f64> {
        self(from, to)
    }
}

/// Straight-line distance at a constant speed.
#[derive(Debug, Clone, Copy)]
pub struct FixedSpeedEta {
    speed_kmh: f64,
}

impl FixedSpeedEta {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }
}

impl Default for FixedSpeedEta {
    fn default() -> Self {
        Self::new(DEFAULT_AVG_SPEED_KMH)
    }
}

impl EtaProvider for FixedSpeedEta {
    fn travel_time_minutes(&self, from: Location, to: Location) -> Option<f64> {
        if self.speed_kmh <= 0.0 {
            return None;
        }
        Some(haversine_km(from, to) / self.speed_kmh * 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_speed_converts_km_to_minutes() {
        let eta = FixedSpeedEta::new(60.0);
        let from = Location::new(0.0, 0.0);
        let to = Location::new(1.0, 0.0);
        let minutes = eta.travel_time_minutes(from, to).expect("eta");
        assert!((minutes - haversine_km(from, to)).abs() < 1e-9);
    }

    #[test]
    fn zero_speed_is_a_failed_lookup() {
        let eta = FixedSpeedEta::new(0.0);
        assert_eq!(
            eta.travel_time_minutes(Location::new(0.0, 0.0), Location::new(1.0, 1.0)),
            None
        );
    }

    #[test]
    fn closures_are_providers() {
        let eta = |_: Location, _: Location| Some(10.0);
        assert_eq!(
            eta.travel_time_minutes(Location::new(0.0, 0.0), Location::new(1.0, 1.0)),
            Some(10.0)
        );
    }
}
