use crate::geo::Location;
use crate::navigation::RouteLeg;

use super::error::OsrmError;
use super::response::{OsrmRoute, OsrmRouteResponse};

pub(super) fn decode_route_response(body: &str) -> Result<OsrmRouteResponse, OsrmError> {
    Ok(serde_json::from_str(body)?)
}

fn first_route(resp: &OsrmRouteResponse) -> Result<&OsrmRoute, OsrmError> {
    if resp.code != "Ok" {
        return Err(OsrmError::Api(resp.code.clone()));
    }
    let route = resp.routes.first().ok_or(OsrmError::NoRoute)?;
    if !route.duration.is_finite() || route.duration < 0.0 {
        return Err(OsrmError::Malformed("route duration"));
    }
    if !route.distance.is_finite() || route.distance < 0.0 {
        return Err(OsrmError::Malformed("route distance"));
    }
    Ok(route)
}

/// Travel time of the first route, in minutes.
pub(super) fn parse_duration_minutes(resp: &OsrmRouteResponse) -> Result<f64, OsrmError> {
    Ok(first_route(resp)?.duration / 60.0)
}

pub(super) fn parse_route_leg(resp: &OsrmRouteResponse) -> Result<RouteLeg, OsrmError> {
    let route = first_route(resp)?;
    let geometry = route
        .geometry
        .as_ref()
        .map(|geometry| {
            geometry
                .coordinates
                .iter()
                .map(|[lng, lat]| Location::try_new(*lat, *lng))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
        .map_err(|_| OsrmError::Malformed("geometry coordinate"))?
        .unwrap_or_default();

    Ok(RouteLeg {
        distance_km: route.distance / 1000.0,
        duration_secs: route.duration,
        geometry,
    })
}

/// `{endpoint}/route/v1/driving/{lng},{lat};{lng},{lat}` without a query string.
pub(super) fn route_url_path(endpoint: &str, from: Location, to: Location) -> String {
    format!(
        "{}/route/v1/driving/{},{};{},{}",
        endpoint.trim_end_matches('/'),
        from.lng,
        from.lat,
        to.lng,
        to.lat
    )
}
