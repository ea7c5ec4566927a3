use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct OsrmRouteResponse {
    pub(super) code: String,
    #[serde(default)]
    pub(super) routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OsrmRoute {
    /// Metres.
    pub(super) distance: f64,
    /// Seconds.
    pub(super) duration: f64,
    #[serde(default)]
    pub(super) geometry: Option<OsrmGeometry>,
}

/// GeoJSON line string; coordinates are `[lng, lat]`.
#[derive(Debug, Deserialize)]
pub(super) struct OsrmGeometry {
    pub(super) coordinates: Vec<[f64; 2]>,
}
