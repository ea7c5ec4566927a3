use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::MatcherConfig;
use crate::eta::EtaProvider;
use crate::graph::SpatialGraph;
use crate::rating::{driver_rating, RatingLookup};

use super::concurrent::{CancellationToken, EtaLookupPool};
use super::score::ScoreComponents;
use super::types::{DriverCandidate, MatchOutcome, MatchResult, Rider};

/// Ranks candidate drivers for a rider.
///
/// A candidate is considered only if it shares at least
/// `min_preference_matches` ride preferences with the rider and its ETA could
/// be looked up. Among those, the lowest composite score wins; on equal scores
/// the candidate listed first is kept.
///
/// The matcher never mutates the graph and holds no per-request state, so one
/// instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct DriverMatcher {
    graph: Arc<SpatialGraph>,
    config: MatcherConfig,
}

impl DriverMatcher {
    pub fn new(graph: Arc<SpatialGraph>) -> Self {
        Self::with_config(graph, MatcherConfig::default())
    }

    pub fn with_config(graph: Arc<SpatialGraph>, config: MatcherConfig) -> Self {
        Self { graph, config }
    }

    pub fn graph(&self) -> &Arc<SpatialGraph> {
        &self.graph
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Whether the driver passes the preference filter for this rider.
    pub fn is_compatible(&self, rider: &Rider, driver: &DriverCandidate) -> bool {
        rider.preferences.matches_with(&driver.preferences) >= self.config.min_preference_matches
    }

    /// Pick the best driver for `rider`, looking ETAs up one candidate at a time.
    ///
    /// Returns `None` when `drivers` is empty or no candidate survives filtering
    /// and ETA lookup.
    pub fn find_best_driver<R, E>(
        &self,
        rider: &Rider,
        drivers: &[DriverCandidate],
        ratings: &R,
        eta: &E,
    ) -> Option<MatchResult>
    where
        R: RatingLookup + ?Sized,
        E: EtaProvider + ?Sized,
    {
        if drivers.is_empty() {
            debug!(rider = %rider.id, "no available drivers");
            return None;
        }

        let scored = drivers
            .iter()
            .filter(|driver| self.passes_filter(rider, driver))
            .filter_map(|driver| {
                let eta_minutes = eta.travel_time_minutes(rider.location, driver.location);
                self.score(rider, driver, eta_minutes, ratings)
            });
        select_best(scored)
    }

    /// Like [`find_best_driver`](Self::find_best_driver), but issues the ETA
    /// lookups of all compatible candidates on `pool`.
    ///
    /// Once `cancel` fires, lookups that have not started are skipped and the
    /// call returns [`MatchOutcome::Cancelled`]. Lookups already in flight finish
    /// within the provider's own timeout; their results are discarded.
    pub fn find_best_driver_concurrent<R, E>(
        &self,
        rider: &Rider,
        drivers: &[DriverCandidate],
        ratings: &R,
        eta: &E,
        pool: &EtaLookupPool,
        cancel: &CancellationToken,
    ) -> MatchOutcome
    where
        R: RatingLookup + ?Sized,
        E: EtaProvider + ?Sized,
    {
        if cancel.is_cancelled() {
            return MatchOutcome::Cancelled;
        }
        if drivers.is_empty() {
            debug!(rider = %rider.id, "no available drivers");
            return MatchOutcome::NoMatch;
        }

        let compatible: Vec<&DriverCandidate> = drivers
            .iter()
            .filter(|driver| self.passes_filter(rider, driver))
            .collect();
        let targets: Vec<_> = compatible.iter().map(|driver| driver.location).collect();

        let Some(etas) = pool.lookup_all(eta, rider.location, &targets, cancel) else {
            debug!(rider = %rider.id, "match cancelled during ETA lookup");
            return MatchOutcome::Cancelled;
        };

        let scored = compatible
            .into_iter()
            .zip(etas)
            .filter_map(|(driver, eta_minutes)| self.score(rider, driver, eta_minutes, ratings));
        select_best(scored).into()
    }

    fn passes_filter(&self, rider: &Rider, driver: &DriverCandidate) -> bool {
        let compatible = self.is_compatible(rider, driver);
        if !compatible {
            debug!(rider = %rider.id, driver = %driver.id, "skipping driver: preferences differ");
        }
        compatible
    }

    fn score<R>(
        &self,
        rider: &Rider,
        driver: &DriverCandidate,
        eta_minutes: Option<f64>,
        ratings: &R,
    ) -> Option<MatchResult>
    where
        R: RatingLookup + ?Sized,
    {
        let distance_km = self.graph.heuristic(rider.location, driver.location);
        let Some(eta_minutes) = eta_minutes else {
            debug!(rider = %rider.id, driver = %driver.id, "skipping driver: ETA unavailable");
            return None;
        };
        let rating = driver_rating(ratings, driver.id);

        let components = ScoreComponents {
            eta_minutes,
            distance_km,
            rating,
        };
        let score = components.composite(&self.config.weights);
        trace!(driver = %driver.id, eta_minutes, distance_km, rating, score, "scored driver");

        Some(MatchResult {
            driver_id: driver.id,
            score,
            eta_minutes,
            distance_km,
            rating,
        })
    }
}

/// Lowest score wins; a later candidate must be strictly better to replace the
/// current best.
fn select_best(scored: impl IntoIterator<Item = MatchResult>) -> Option<MatchResult> {
    let mut best: Option<MatchResult> = None;
    let mut best_score = f64::INFINITY;
    for candidate in scored {
        if candidate.score < best_score {
            best_score = candidate.score;
            best = Some(candidate);
        }
    }
    best
}
