use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiderId(pub u64);

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "driver-{}", self.0)
    }
}

impl fmt::Display for RiderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rider-{}", self.0)
    }
}

/// Ride attributes riders and drivers agree on. Missing flags are `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidePreferences {
    pub smoking: bool,
    pub music: bool,
    pub pets: bool,
}

impl RidePreferences {
    pub const fn new(smoking: bool, music: bool, pets: bool) -> Self {
        Self {
            smoking,
            music,
            pets,
        }
    }

    /// How many of the three flags are equal between `self` and `other`.
    pub fn matches_with(&self, other: &RidePreferences) -> u8 {
        u8::from(self.smoking == other.smoking)
            + u8::from(self.music == other.music)
            + u8::from(self.pets == other.pets)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rider {
    pub id: RiderId,
    pub location: Location,
    #[serde(flatten)]
    pub preferences: RidePreferences,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverCandidate {
    pub id: DriverId,
    pub location: Location,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(flatten)]
    pub preferences: RidePreferences,
    /// Last stored average rating, 1.0..=5.0.
    #[serde(default = "default_rating")]
    pub rating: f64,
}

fn default_available() -> bool {
    true
}

fn default_rating() -> f64 {
    5.0
}

/// Winning candidate of a match together with the terms of its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub driver_id: DriverId,
    pub score: f64,
    pub eta_minutes: f64,
    pub distance_km: f64,
    pub rating: f64,
}

/// Result of a cancellable match.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matched(MatchResult),
    NoMatch,
    Cancelled,
}

impl MatchOutcome {
    pub fn matched(self) -> Option<MatchResult> {
        match self {
            MatchOutcome::Matched(result) => Some(result),
            MatchOutcome::NoMatch | MatchOutcome::Cancelled => None,
        }
    }
}

impl From<Option<MatchResult>> for MatchOutcome {
    fn from(result: Option<MatchResult>) -> Self {
        result.map_or(MatchOutcome::NoMatch, MatchOutcome::Matched)
    }
}
