//! Policy and tuning parameters.
//!
//! Every struct has a `Default` carrying the production policy constants, and the
//! whole set deserializes from JSON so deployments can override individual fields:
//!
//! ```json
//! { "matcher": { "min_preference_matches": 3 }, "graph": { "heuristic_scale": 1.5 } }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default weight of the live ETA (minutes) in the composite score.
pub const DEFAULT_ETA_WEIGHT: f64 = 0.5;
/// Default weight of the straight-line distance (km) in the composite score.
pub const DEFAULT_DISTANCE_WEIGHT: f64 = 0.3;
/// Minimum number of matching ride preferences (out of three).
pub const DEFAULT_MIN_PREFERENCE_MATCHES: u8 = 2;
/// Average city speed used for duration estimates (km/h).
pub const DEFAULT_AVG_SPEED_KMH: f64 = 40.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RideConfig {
    pub graph: GraphConfig,
    pub matcher: MatcherConfig,
    pub navigation: NavigationConfig,
    pub osrm: OsrmConfig,
}

impl RideConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: RideConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.graph.validate()?;
        self.matcher.validate()?;
        self.navigation.validate()?;
        self.osrm.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphConfig {
    /// Edge-weight units per kilometre of straight-line distance.
    ///
    /// `1.0` keeps the heuristic in km, which is admissible when edge weights are
    /// km. Graphs weighted in minutes should use `60 / max_speed_kmh`; `0.0`
    /// turns the search into Dijkstra.
    pub heuristic_scale: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            heuristic_scale: 1.0,
        }
    }
}

impl GraphConfig {
    /// Scale for graphs whose weights are travel minutes, given the fastest
    /// speed any edge can be traversed at.
    pub fn for_minutes(max_speed_kmh: f64) -> Self {
        Self {
            heuristic_scale: 60.0 / max_speed_kmh,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.heuristic_scale.is_finite() || self.heuristic_scale < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "graph.heuristic_scale must be finite and >= 0, got {}",
                self.heuristic_scale
            )));
        }
        Ok(())
    }
}

/// Weights of the composite driver score `(eta_w * eta + distance_w * km) / rating`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoreWeights {
    pub eta: f64,
    pub distance: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            eta: DEFAULT_ETA_WEIGHT,
            distance: DEFAULT_DISTANCE_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatcherConfig {
    pub weights: ScoreWeights,
    /// Candidates sharing fewer preferences with the rider are skipped.
    pub min_preference_matches: u8,
    /// Upper bound on ETA lookups in flight for one concurrent match.
    pub max_concurrent_eta_lookups: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            min_preference_matches: DEFAULT_MIN_PREFERENCE_MATCHES,
            max_concurrent_eta_lookups: 8,
        }
    }
}

impl MatcherConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let ScoreWeights { eta, distance } = self.weights;
        if !(eta.is_finite() && eta >= 0.0 && distance.is_finite() && distance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "matcher.weights must be finite and >= 0, got eta={eta} distance={distance}"
            )));
        }
        if self.min_preference_matches > 3 {
            return Err(ConfigError::Invalid(format!(
                "matcher.min_preference_matches must be at most 3, got {}",
                self.min_preference_matches
            )));
        }
        if self.max_concurrent_eta_lookups == 0 {
            return Err(ConfigError::Invalid(
                "matcher.max_concurrent_eta_lookups must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavigationConfig {
    /// Speed used to turn graph distances into durations.
    pub avg_speed_kmh: f64,
    /// Capacity of the route LRU cache.
    pub route_cache_capacity: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            avg_speed_kmh: DEFAULT_AVG_SPEED_KMH,
            route_cache_capacity: 20_000,
        }
    }
}

impl NavigationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.avg_speed_kmh.is_finite() || self.avg_speed_kmh <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "navigation.avg_speed_kmh must be > 0, got {}",
                self.avg_speed_kmh
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OsrmConfig {
    pub endpoint: String,
    /// Per-request timeout; a timed out lookup counts as a failed one.
    pub timeout_ms: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://router.project-osrm.org".to_string(),
            timeout_ms: 3_000,
        }
    }
}

impl OsrmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("osrm.endpoint must not be empty".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("osrm.timeout_ms must be > 0".to_string()));
        }
        Ok(())
    }
}
