//! HTTP client and wire types for an Overpass-compatible map-data service.

use std::collections::HashMap;

use healthmap_core::Coordinate;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ServiceError;
use crate::http::{build_client, parse_endpoint_url, read_json};

/// Server-side timeout requested inside the query itself.
const QUERY_TIMEOUT_SECS: u64 = 25;

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    pub elements: Vec<OverpassElement>,
}

/// A node, way, or relation from an `out center` query.
///
/// Nodes carry `lat`/`lon`; ways and relations carry a `center`.
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassElement {
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<OverpassCenter>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

impl OverpassElement {
    /// The element's own point, or its centroid for non-point geometry.
    ///
    /// `None` when neither is present or the values are out of range.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        let (lat, lon) = match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => (lat, lon),
            (_, _, Some(center)) => (center.lat, center.lon),
            _ => return None,
        };
        Coordinate::new(lat, lon)
    }

    /// Non-blank value of a tag.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Builds the query for hospitals and supermarkets within `radius_km` of
/// `origin`, asking for centroids of ways and relations.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn build_query(origin: Coordinate, radius_km: f64) -> String {
    let radius_m = (radius_km * 1000.0).round().max(0.0) as u64;
    let lat = origin.latitude;
    let lon = origin.longitude;
    format!(
        "[out:json][timeout:{QUERY_TIMEOUT_SECS}];\
         (\
         nwr[\"amenity\"=\"hospital\"](around:{radius_m},{lat},{lon});\
         nwr[\"shop\"=\"supermarket\"](around:{radius_m},{lat},{lon});\
         );\
         out center;"
    )
}

pub struct OverpassClient {
    client: Client,
    endpoint: Url,
}

impl OverpassClient {
    /// `endpoint` is the full interpreter URL, e.g.
    /// `https://overpass-api.de/api/interpreter`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Http`] if the `reqwest::Client` cannot be built
    /// or [`ServiceError::InvalidBaseUrl`] if `endpoint` does not parse.
    pub fn new(endpoint: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ServiceError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            endpoint: parse_endpoint_url(endpoint)?,
        })
    }

    /// Posts the discovery query and returns the raw elements in response
    /// order.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Http`] / [`ServiceError::UnexpectedStatus`] on transport failure.
    /// - [`ServiceError::Deserialize`] if the body lacks an `elements` array.
    pub async fn fetch_elements(
        &self,
        origin: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<OverpassElement>, ServiceError> {
        let query = build_query(origin, radius_km);
        tracing::debug!(%origin, radius_km, "querying map data");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(query)
            .send()
            .await?;
        let body: OverpassResponse =
            read_json(response, &format!("map data around {origin}")).await?;
        Ok(body.elements)
    }
}
