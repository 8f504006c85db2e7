//! OSRM-backed travel estimates for delivery candidates.
//!
//! Pricing never depends on this; it serves callers that want to show travel
//! distance/duration alongside a priced slot. Batching distances stay on the
//! great-circle formula in [crate::spatial].

use std::error::Error;
use std::fmt;
use std::time::Duration;

use reqwest::{blocking::Client, Url};
use serde::{Deserialize, Serialize};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors encountered while fetching a route estimate.
#[derive(Debug)]
pub enum RoutingError {
    Http(reqwest::Error),
    Json(reqwest::Error),
    Api(String),
    NoRoute,
}

impl From<reqwest::Error> for RoutingError {
    fn from(err: reqwest::Error) -> Self {
        RoutingError::Http(err)
    }
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::Http(err) => write!(f, "OSRM request failed: {err}"),
            RoutingError::Json(err) => write!(f, "OSRM response was not valid JSON: {err}"),
            RoutingError::Api(msg) => write!(f, "OSRM error: {msg}"),
            RoutingError::NoRoute => write!(f, "OSRM returned no route"),
        }
    }
}

impl Error for RoutingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RoutingError::Http(err) | RoutingError::Json(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteProfile {
    Driving,
    Cycling,
    Walking,
}

impl RouteProfile {
    fn as_str(self) -> &'static str {
        match self {
            RouteProfile::Driving => "driving",
            RouteProfile::Cycling => "cycling",
            RouteProfile::Walking => "walking",
        }
    }
}

/// Durations in seconds per delivery mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TravelDurations {
    pub car: f64,
    pub motorcycle: f64,
    pub bicycle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelEstimates {
    pub distance_meters: f64,
    pub durations_seconds: TravelDurations,
}

#[derive(Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    routes: Option<Vec<OsrmRoute>>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
}

/// Thin HTTP client for the OSRM `/route` API.
#[derive(Debug, Clone)]
pub struct OsrmRouteClient {
    client: Client,
    endpoint: String,
}

impl OsrmRouteClient {
    /// Create a client for the given OSRM endpoint (e.g. `http://localhost:5000`).
    pub fn new(endpoint: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build OSRM client");
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch `(distance_meters, duration_seconds)` for one profile.
    pub fn route(
        &self,
        profile: RouteProfile,
        from_lat: f64,
        from_lon: f64,
        to_lat: f64,
        to_lon: f64,
    ) -> Result<(f64, f64), RoutingError> {
        // OSRM expects lon,lat order
        let base = format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}",
            self.endpoint,
            profile.as_str(),
            from_lon,
            from_lat,
            to_lon,
            to_lat
        );
        let mut url = Url::parse(&base)
            .map_err(|err| RoutingError::Api(format!("failed to build OSRM URL: {err}")))?;
        url.query_pairs_mut()
            .append_pair("overview", "false")
            .append_pair("alternatives", "false")
            .append_pair("steps", "false");

        let response = self.client.get(url).send().map_err(RoutingError::Http)?;
        let parsed: OsrmRouteResponse = response.json().map_err(RoutingError::Json)?;
        parse_route_response(parsed)
    }

    /// Distance and per-mode durations between two points.
    ///
    /// Cycling falls back to a slowed-down driving estimate when the OSRM
    /// instance serves no cycling profile; motorcycle rides the driving
    /// profile at a faster clip.
    pub fn travel_estimates(
        &self,
        from_lat: f64,
        from_lon: f64,
        to_lat: f64,
        to_lon: f64,
    ) -> Result<TravelEstimates, RoutingError> {
        let (distance_m, dur_car) =
            self.route(RouteProfile::Driving, from_lat, from_lon, to_lat, to_lon)?;

        let dur_bicycle = match self.route(RouteProfile::Cycling, from_lat, from_lon, to_lat, to_lon)
        {
            Ok((_, duration)) => duration,
            Err(_) => dur_car * 2.5,
        };

        Ok(TravelEstimates {
            distance_meters: distance_m,
            durations_seconds: TravelDurations {
                car: dur_car,
                motorcycle: dur_car * 0.8,
                bicycle: dur_bicycle,
            },
        })
    }
}

fn parse_route_response(parsed: OsrmRouteResponse) -> Result<(f64, f64), RoutingError> {
    if parsed.code != "Ok" {
        return Err(RoutingError::Api(
            parsed.message.unwrap_or(parsed.code),
        ));
    }
    let route = parsed
        .routes
        .and_then(|routes| routes.into_iter().next())
        .ok_or(RoutingError::NoRoute)?;
    Ok((route.distance, route.duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_yields_distance_and_duration() {
        let parsed: OsrmRouteResponse = serde_json::from_str(
            r#"{"code":"Ok","routes":[{"distance":1523.4,"duration":312.7}]}"#,
        )
        .expect("parse");
        let (distance, duration) = parse_route_response(parsed).expect("route");
        assert_eq!(distance, 1523.4);
        assert_eq!(duration, 312.7);
    }

    #[test]
    fn api_errors_carry_the_message() {
        let parsed: OsrmRouteResponse =
            serde_json::from_str(r#"{"code":"NoSegment","message":"could not snap"}"#)
                .expect("parse");
        match parse_route_response(parsed) {
            Err(RoutingError::Api(msg)) => assert_eq!(msg, "could not snap"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn empty_route_list_is_no_route() {
        let parsed: OsrmRouteResponse =
            serde_json::from_str(r#"{"code":"Ok","routes":[]}"#).expect("parse");
        assert!(matches!(
            parse_route_response(parsed),
            Err(RoutingError::NoRoute)
        ));
    }
}
