//! Driving routes from an OSRM-compatible routing service.

use healthmap_core::{round_to_tenth, Coordinate, Route};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::{RoutingError, ServiceError};
use crate::http::{build_client, join, parse_base_url};

#[derive(Debug, Clone, Deserialize)]
pub struct OsrmResponse {
    pub code: String,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OsrmRoute {
    pub geometry: OsrmGeometry,
    /// Seconds.
    pub duration: f64,
    /// Meters.
    pub distance: f64,
}

/// GeoJSON line geometry; positions are longitude-first.
#[derive(Debug, Clone, Deserialize)]
pub struct OsrmGeometry {
    pub coordinates: Vec<Vec<f64>>,
}

pub struct OsrmClient {
    client: Client,
    base_url: Url,
}

impl OsrmClient {
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the `reqwest::Client` cannot be built
    /// or [`ServiceError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ServiceError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Requests a driving route with full GeoJSON geometry.
    ///
    /// OSRM reports "no route" as a JSON body with a non-`Ok` code, often on a
    /// 400 response, so the body is parsed before the status is judged.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Http`] on transport failure.
    /// - [`ServiceError::UnexpectedStatus`] for a non-2xx response without a
    ///   routing-service body.
    /// - [`ServiceError::Deserialize`] if a 2xx body does not parse.
    pub async fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<OsrmResponse, ServiceError> {
        let url = self.route_url(origin, destination)?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<OsrmResponse>(&body) {
            Ok(parsed) if status.is_success() || parsed.code != "Ok" => Ok(parsed),
            Ok(_) => Err(ServiceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }),
            Err(_) if !status.is_success() => Err(ServiceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }),
            Err(e) => Err(ServiceError::Deserialize {
                context: format!("route {origin} -> {destination}"),
                source: e,
            }),
        }
    }

    fn route_url(&self, origin: Coordinate, destination: Coordinate) -> Result<Url, ServiceError> {
        let path = format!(
            "route/v1/driving/{},{};{},{}",
            origin.longitude, origin.latitude, destination.longitude, destination.latitude
        );
        let mut url = join(&self.base_url, &path)?;
        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson");
        Ok(url)
    }
}

/// Converts the first route of a routing response into the engine's
/// latitude-first [`Route`].
///
/// # Errors
///
/// Returns [`RoutingError::NoRoute`] when the code is not `Ok` or no route is
/// present.
pub fn decode_route(response: OsrmResponse) -> Result<Route, RoutingError> {
    if response.code != "Ok" {
        return Err(RoutingError::NoRoute {
            code: response.code,
        });
    }
    let Some(route) = response.routes.into_iter().next() else {
        return Err(RoutingError::NoRoute {
            code: "NoRoute".to_owned(),
        });
    };

    let polyline = route
        .geometry
        .coordinates
        .iter()
        .filter_map(|position| match position.as_slice() {
            [lon, lat, ..] => Some(Coordinate {
                latitude: *lat,
                longitude: *lon,
            }),
            _ => None,
        })
        .collect();

    Ok(Route {
        polyline,
        duration_minutes: seconds_to_minutes(route.duration),
        distance_km: round_to_tenth(route.distance / 1000.0),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn seconds_to_minutes(seconds: f64) -> u32 {
    let minutes = (seconds / 60.0).round();
    if minutes.is_finite() && minutes > 0.0 {
        minutes.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Plans routes between two coordinates.
pub struct RoutePlanner {
    client: OsrmClient,
}

impl RoutePlanner {
    #[must_use]
    pub fn new(client: OsrmClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// - [`RoutingError::Service`] on transport or parse failure.
    /// - [`RoutingError::NoRoute`] when the service finds no viable route.
    pub async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Route, RoutingError> {
        let response = self.client.fetch_route(origin, destination).await?;
        let route = decode_route(response)?;
        tracing::debug!(
            points = route.polyline.len(),
            minutes = route.duration_minutes,
            km = route.distance_km,
            "route planned"
        );
        Ok(route)
    }
}
