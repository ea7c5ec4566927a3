//! Driver selection for a single ride request.
//!
//! - **Preference filter**: candidates must share enough ride preferences with the rider
//! - **Composite score**: weighted live ETA plus straight-line distance, divided by rating
//! - **Sequential and concurrent paths**: [`DriverMatcher::find_best_driver`] looks ETAs
//!   up one by one; [`DriverMatcher::find_best_driver_concurrent`] fans them out over a
//!   bounded [`EtaLookupPool`] and honours a [`CancellationToken`]. Both pick the same driver.

pub mod concurrent;
pub mod matcher;
pub mod score;
pub mod types;

pub use concurrent::{CancellationToken, EtaLookupPool};
pub use matcher::DriverMatcher;
pub use score::ScoreComponents;
pub use types::{
    DriverCandidate, DriverId, MatchOutcome, MatchResult, RidePreferences, Rider, RiderId,
};
