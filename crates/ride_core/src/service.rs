//! Request-level entry point: pull available drivers and pick one.

use std::sync::Arc;

use rayon::ThreadPoolBuildError;
use tracing::info;

use crate::eta::EtaProvider;
use crate::matching::{
    CancellationToken, DriverMatcher, EtaLookupPool, MatchOutcome, MatchResult, Rider,
};
use crate::rating::RatingLookup;
use crate::store::DriverStore;

/// Wires a [`DriverMatcher`] to its collaborators.
///
/// All collaborators are shared, so a single service can answer requests from
/// several threads at once.
pub struct MatchService {
    matcher: DriverMatcher,
    drivers: Arc<dyn DriverStore>,
    ratings: Arc<dyn RatingLookup>,
    eta: Arc<dyn EtaProvider>,
    pool: Option<EtaLookupPool>,
}

impl MatchService {
    pub fn new(
        matcher: DriverMatcher,
        drivers: Arc<dyn DriverStore>,
        ratings: Arc<dyn RatingLookup>,
        eta: Arc<dyn EtaProvider>,
    ) -> Self {
        Self {
            matcher,
            drivers,
            ratings,
            eta,
            pool: None,
        }
    }

    /// Give the service a lookup pool sized by
    /// `MatcherConfig::max_concurrent_eta_lookups`.
    pub fn with_eta_pool(mut self) -> Result<Self, ThreadPoolBuildError> {
        let pool = EtaLookupPool::new(self.matcher.config().max_concurrent_eta_lookups)?;
        self.pool = Some(pool);
        Ok(self)
    }

    pub fn matcher(&self) -> &DriverMatcher {
        &self.matcher
    }

    pub fn match_rider(&self, rider: &Rider) -> Option<MatchResult> {
        let drivers = self.drivers.list_available();
        let result = self.matcher.find_best_driver(
            rider,
            &drivers,
            self.ratings.as_ref(),
            self.eta.as_ref(),
        );
        log_decision(rider, drivers.len(), result.as_ref());
        result
    }

    /// Match with ETA lookups fanned out over the service's pool.
    ///
    /// Without a pool (see [`with_eta_pool`](Self::with_eta_pool)) lookups run
    /// sequentially; cancellation is still honoured before the match starts.
    pub fn match_rider_concurrent(
        &self,
        rider: &Rider,
        cancel: &CancellationToken,
    ) -> MatchOutcome {
        let Some(pool) = &self.pool else {
            if cancel.is_cancelled() {
                return MatchOutcome::Cancelled;
            }
            return self.match_rider(rider).into();
        };

        let drivers = self.drivers.list_available();
        let outcome = self.matcher.find_best_driver_concurrent(
            rider,
            &drivers,
            self.ratings.as_ref(),
            self.eta.as_ref(),
            pool,
            cancel,
        );
        match &outcome {
            MatchOutcome::Matched(best) => log_decision(rider, drivers.len(), Some(best)),
            MatchOutcome::NoMatch => log_decision(rider, drivers.len(), None),
            MatchOutcome::Cancelled => info!(rider = %rider.id, "match cancelled"),
        }
        outcome
    }
}

fn log_decision(rider: &Rider, candidates: usize, result: Option<&MatchResult>) {
    match result {
        Some(best) => info!(
            rider = %rider.id,
            driver = %best.driver_id,
            score = best.score,
            eta_minutes = best.eta_minutes,
            candidates,
            "matched rider"
        ),
        None => info!(rider = %rider.id, candidates, "no suitable driver"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Location;
    use crate::graph::SpatialGraph;
    use crate::matching::{DriverCandidate, DriverId, RidePreferences, RiderId};
    use crate::rating::InMemoryRatingStore;
    use crate::store::InMemoryDriverStore;

    fn driver(id: u64, lat: f64, available: bool) -> DriverCandidate {
        DriverCandidate {
            id: DriverId(id),
            location: Location::new(lat, 0.0),
            is_available: available,
            preferences: RidePreferences::new(false, true, true),
            rating: 5.0,
        }
    }

    fn service(drivers: Vec<DriverCandidate>) -> MatchService {
        let eta = |from: Location, to: Location| Some((to.lat - from.lat).abs() * 100.0);
        MatchService::new(
            DriverMatcher::new(Arc::new(SpatialGraph::new())),
            Arc::new(InMemoryDriverStore::from_drivers(drivers)),
            Arc::new(InMemoryRatingStore::new()),
            Arc::new(eta),
        )
    }

    fn rider() -> Rider {
        Rider {
            id: RiderId(7),
            location: Location::new(0.0, 0.0),
            preferences: RidePreferences::new(false, true, true),
        }
    }

    #[test]
    fn unavailable_drivers_are_never_matched() {
        let svc = service(vec![driver(1, 0.001, false), driver(2, 0.05, true)]);
        let best = svc.match_rider(&rider()).expect("match");
        assert_eq!(best.driver_id, DriverId(2));
    }

    #[test]
    fn pooled_and_plain_matching_agree() {
        let drivers = (1..=20).map(|i| driver(i, f64::from(i as u32) * 0.01, true)).collect();
        let svc = service(drivers).with_eta_pool().expect("pool");
        let plain = svc.match_rider(&rider());
        let pooled = svc.match_rider_concurrent(&rider(), &CancellationToken::new());
        assert_eq!(pooled.matched(), plain);
    }

    #[test]
    fn cancelled_before_start_without_pool() {
        let svc = service(vec![driver(1, 0.01, true)]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(svc.match_rider_concurrent(&rider(), &cancel), MatchOutcome::Cancelled);
    }
}
