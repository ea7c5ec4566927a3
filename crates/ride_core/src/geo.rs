//! Geographic primitives: coordinate pairs and great-circle distance.
//!
//! A [`Location`] doubles as the node identity of the [`SpatialGraph`](crate::graph::SpatialGraph):
//! two locations are the same node exactly when their coordinate pairs compare equal.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius used by the Haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Error, PartialEq)]
pub enum LocationError {
    #[error("coordinate is not finite: ({lat}, {lng})")]
    NotFinite { lat: f64, lng: f64 },
    #[error("failed to parse location '{0}', expected 'lat,lng'")]
    Parse(String),
}

/// A `(latitude, longitude)` pair in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Checked constructor; rejects NaN and infinite coordinates.
    pub fn try_new(lat: f64, lng: f64) -> Result<Self, LocationError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(LocationError::NotFinite { lat, lng });
        }
        Ok(Self { lat, lng })
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Location) -> f64 {
        haversine_km(*self, *other)
    }

    // -0.0 and 0.0 must hash alike since they compare equal.
    fn key_bits(&self) -> (u64, u64) {
        let canon = |v: f64| if v == 0.0 { 0.0_f64.to_bits() } else { v.to_bits() };
        (canon(self.lat), canon(self.lng))
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.key_bits() == other.key_bits()
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_bits().hash(state);
    }
}

impl From<(f64, f64)> for Location {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| LocationError::Parse(s.to_string()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| LocationError::Parse(s.to_string()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| LocationError::Parse(s.to_string()))?;
        Location::try_new(lat, lng)
    }
}

/// Haversine distance between two locations in kilometres.
pub fn haversine_km(a: Location, b: Location) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let sin_dlat = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon = ((lon2 - lon1) * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}
