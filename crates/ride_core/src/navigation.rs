//! Pluggable route providers and trip planning.
//!
//! - **`GraphRouteProvider`**: A* over a shared [`SpatialGraph`], durations estimated at an
//!   average speed.
//! - **`OsrmClient`** (feature `osrm`): road-network routes from an OSRM endpoint.
//! - **`CachedRouteProvider`**: LRU cache in front of any provider, with an optional fallback.
//!
//! [`plan_trip`] chains the driver → pickup and pickup → dropoff legs of a ride.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::DEFAULT_AVG_SPEED_KMH;
use crate::geo::{haversine_km, Location};
use crate::graph::SpatialGraph;

#[derive(Debug, Error, PartialEq)]
pub enum NavigationError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: Location, to: Location },
}

/// One routed leg between two locations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLeg {
    pub distance_km: f64,
    pub duration_secs: f64,
    /// Points along the leg, first and last included when known.
    pub geometry: Vec<Location>,
}

/// Routing backend. Implementations are shared between request handlers.
pub trait RouteProvider: Send + Sync {
    /// Route from `from` to `to`, or `None` when no route exists.
    fn route(&self, from: Location, to: Location) -> Option<RouteLeg>;
}

/// Routes over the traffic-weighted [`SpatialGraph`].
#[derive(Debug, Clone)]
pub struct GraphRouteProvider {
    graph: Arc<SpatialGraph>,
    avg_speed_kmh: f64,
}

impl GraphRouteProvider {
    pub fn new(graph: Arc<SpatialGraph>) -> Self {
        Self::with_speed(graph, DEFAULT_AVG_SPEED_KMH)
    }

    pub fn with_speed(graph: Arc<SpatialGraph>, avg_speed_kmh: f64) -> Self {
        Self {
            graph,
            avg_speed_kmh,
        }
    }
}

impl RouteProvider for GraphRouteProvider {
    fn route(&self, from: Location, to: Location) -> Option<RouteLeg> {
        let result = self.graph.shortest_path(from, to);
        if !result.is_found() {
            return None;
        }
        let distance_km: f64 = result
            .path
            .windows(2)
            .map(|pair| haversine_km(pair[0], pair[1]))
            .sum();
        let duration_secs = if distance_km > 0.0 && self.avg_speed_kmh > 0.0 {
            (distance_km / self.avg_speed_kmh) * 3600.0
        } else {
            0.0
        };
        Some(RouteLeg {
            distance_km,
            duration_secs,
            geometry: result.path,
        })
    }
}

/// LRU-cached wrapper around any [`RouteProvider`].
///
/// Keys are directed `(from, to)` pairs and only successful routes are cached.
/// When the inner provider fails, the optional fallback is asked before giving up.
/// Routes over a graph with live traffic go stale; cache road-network providers.
pub struct CachedRouteProvider {
    inner: Box<dyn RouteProvider>,
    fallback: Option<Box<dyn RouteProvider>>,
    cache: Mutex<LruCache<(Location, Location), RouteLeg>>,
}

impl CachedRouteProvider {
    pub fn new(inner: Box<dyn RouteProvider>, capacity: usize) -> Self {
        Self {
            inner,
            fallback: None,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    pub fn with_fallback(mut self, fallback: Box<dyn RouteProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }
}

impl RouteProvider for CachedRouteProvider {
    fn route(&self, from: Location, to: Location) -> Option<RouteLeg> {
        let key = (from, to);
        if let Some(cached) = self.cache.lock().get(&key) {
            return Some(cached.clone());
        }

        let result = self.inner.route(from, to).or_else(|| {
            let fallback = self.fallback.as_ref()?;
            debug!(%from, %to, "primary route provider failed, using fallback");
            fallback.route(from, to)
        });

        if let Some(route) = &result {
            self.cache.lock().put(key, route.clone());
        }
        result
    }
}

/// Driver → pickup → dropoff itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPlan {
    pub to_pickup: RouteLeg,
    pub to_dropoff: RouteLeg,
    pub total_distance_km: f64,
    pub total_duration_secs: f64,
    /// Both legs joined, with the shared pickup point listed once.
    pub geometry: Vec<Location>,
}

pub fn plan_trip<P: RouteProvider + ?Sized>(
    provider: &P,
    driver: Location,
    pickup: Location,
    dropoff: Location,
) -> Result<TripPlan, NavigationError> {
    let to_pickup = provider
        .route(driver, pickup)
        .ok_or(NavigationError::NoRoute {
            from: driver,
            to: pickup,
        })?;
    let to_dropoff = provider
        .route(pickup, dropoff)
        .ok_or(NavigationError::NoRoute {
            from: pickup,
            to: dropoff,
        })?;

    let mut geometry = to_pickup.geometry.clone();
    let mut rest = to_dropoff.geometry.as_slice();
    if let (Some(last), Some(first)) = (geometry.last(), rest.first()) {
        if last == first {
            rest = &rest[1..];
        }
    }
    geometry.extend_from_slice(rest);

    Ok(TripPlan {
        total_distance_km: to_pickup.distance_km + to_dropoff.distance_km,
        total_duration_secs: to_pickup.duration_secs + to_dropoff.duration_secs,
        geometry,
        to_pickup,
        to_dropoff,
    })
}
