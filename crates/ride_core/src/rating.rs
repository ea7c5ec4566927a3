//! Driver ratings: submission with boundary validation and average lookup.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::matching::{DriverId, RiderId};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;
/// Rating assumed for drivers nobody has rated yet.
pub const DEFAULT_RATING: f64 = 5.0;

#[derive(Debug, Error, PartialEq)]
pub enum RatingError {
    #[error("rating {0} is outside 1..=5")]
    OutOfRange(f64),
}

/// Source of a driver's average rating.
pub trait RatingLookup: Send + Sync {
    /// Mean of all recorded scores, or `None` when the driver has no ratings.
    fn average_rating(&self, driver: DriverId) -> Option<f64>;
}

impl<F> RatingLookup for F
where
    F: Fn(DriverId) -> Option<f64> + Send + Sync,
{
    fn average_rating(&self, driver: DriverId) -> Option<f64> {
        self(driver)
    }
}

/// Rating used for scoring: the average rounded to two decimals, or
/// [`DEFAULT_RATING`] when the driver has none.
pub fn driver_rating<R: RatingLookup + ?Sized>(lookup: &R, driver: DriverId) -> f64 {
    lookup
        .average_rating(driver)
        // A zero average would divide the composite score by zero.
        .filter(|avg| avg.is_finite() && *avg > 0.0)
        .map(round_to_cents)
        .unwrap_or(DEFAULT_RATING)
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn validate_score(score: f64) -> Result<f64, RatingError> {
    if (MIN_RATING..=MAX_RATING).contains(&score) {
        Ok(score)
    } else {
        Err(RatingError::OutOfRange(score))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub rider_id: RiderId,
    pub driver_id: DriverId,
    pub score: f64,
    #[serde(default)]
    pub submitted_at_ms: u64,
}

/// Thread-safe in-memory rating store.
#[derive(Debug, Default)]
pub struct InMemoryRatingStore {
    records: RwLock<HashMap<DriverId, Vec<RatingRecord>>>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rating and return the driver's new rounded average.
    pub fn submit(
        &self,
        rider_id: RiderId,
        driver_id: DriverId,
        score: f64,
    ) -> Result<f64, RatingError> {
        let score = validate_score(score)?;
        let record = RatingRecord {
            rider_id,
            driver_id,
            score,
            submitted_at_ms: now_ms(),
        };
        self.records.write().entry(driver_id).or_default().push(record);

        let average = driver_rating(self, driver_id);
        debug!(%driver_id, %rider_id, score, average, "rating submitted");
        Ok(average)
    }

    /// Insert a previously persisted record, validating its score.
    pub fn insert_record(&self, record: RatingRecord) -> Result<(), RatingError> {
        validate_score(record.score)?;
        self.records
            .write()
            .entry(record.driver_id)
            .or_default()
            .push(record);
        Ok(())
    }

    /// All ratings of `driver_id` in submission order.
    pub fn ratings_for(&self, driver_id: DriverId) -> Vec<RatingRecord> {
        self.records
            .read()
            .get(&driver_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl RatingLookup for InMemoryRatingStore {
    fn average_rating(&self, driver: DriverId) -> Option<f64> {
        let records = self.records.read();
        let scores = records.get(&driver).filter(|r| !r.is_empty())?;
        Some(scores.iter().map(|r| r.score).sum::<f64>() / scores.len() as f64)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
