use reqwest::blocking::Client;
use reqwest::Url;
use tracing::warn;

use crate::config::OsrmConfig;
use crate::eta::EtaProvider;
use crate::geo::Location;
use crate::navigation::{RouteLeg, RouteProvider};

use super::error::OsrmError;
use super::parser::{decode_route_response, parse_duration_minutes, parse_route_leg, route_url_path};
use super::response::OsrmRouteResponse;

/// Blocking client for the OSRM `route` service.
///
/// Used both as an [`EtaProvider`] (duration only) and as a [`RouteProvider`]
/// (full GeoJSON geometry). Every failure, including a timeout, surfaces as
/// "unavailable" through those traits and is logged.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    client: Client,
    endpoint: String,
}

impl OsrmClient {
    pub fn new(config: &OsrmConfig) -> Result<Self, OsrmError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Driving time in minutes, with the failure reason on error.
    pub fn try_travel_time_minutes(&self, from: Location, to: Location) -> Result<f64, OsrmError> {
        let resp = self.fetch(from, to, &[("overview", "false")])?;
        parse_duration_minutes(&resp)
    }

    pub fn try_route(&self, from: Location, to: Location) -> Result<RouteLeg, OsrmError> {
        let resp = self.fetch(from, to, &[("overview", "full"), ("geometries", "geojson")])?;
        parse_route_leg(&resp)
    }

    fn fetch(
        &self,
        from: Location,
        to: Location,
        query: &[(&str, &str)],
    ) -> Result<OsrmRouteResponse, OsrmError> {
        let mut url = Url::parse(&route_url_path(&self.endpoint, from, to))
            .map_err(|err| OsrmError::Url(err.to_string()))?;
        url.query_pairs_mut().extend_pairs(query);

        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(OsrmError::Status(status.as_u16()));
        }
        decode_route_response(&response.text()?)
    }
}

impl EtaProvider for OsrmClient {
    fn travel_time_minutes(&self, from: Location, to: Location) -> Option<f64> {
        match self.try_travel_time_minutes(from, to) {
            Ok(minutes) => Some(minutes),
            Err(err) => {
                warn!(%from, %to, error = %err, "OSRM ETA lookup failed");
                None
            }
        }
    }
}

impl RouteProvider for OsrmClient {
    fn route(&self, from: Location, to: Location) -> Option<RouteLeg> {
        match self.try_route(from, to) {
            Ok(leg) => Some(leg),
            Err(err) => {
                warn!(%from, %to, error = %err, "OSRM route lookup failed");
                None
            }
        }
    }
}
