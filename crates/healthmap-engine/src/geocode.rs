//! HTTP client for a Nominatim-compatible forward/reverse geocoding service.

use healthmap_core::Coordinate;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ServiceError;
use crate::http::{build_client, join, parse_base_url, read_json};

/// First forward-geocoding result for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub coordinate: Coordinate,
    /// Full comma-separated place description from the service.
    pub display_name: String,
}

impl GeocodeHit {
    /// The leading segment of the description, e.g. `"Springfield"` for
    /// `"Springfield, Sangamon County, Illinois, United States"`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.display_name
            .split(',')
            .next()
            .map_or("", str::trim)
    }
}

/// The `address` object of a reverse-geocoding response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReverseAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub suburb: Option<String>,
}

impl ReverseAddress {
    /// Best human-readable locality: city, then town, village, suburb.
    #[must_use]
    pub fn locality(&self) -> Option<&str> {
        [&self.city, &self.town, &self.village, &self.suburb]
            .into_iter()
            .filter_map(Option::as_deref)
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct RawSearchHit {
    lat: NumberOrText,
    lon: NumberOrText,
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct RawReverse {
    address: Option<ReverseAddress>,
}

/// Nominatim sends coordinates as strings; tolerate plain numbers too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrText::Number(n) => Some(*n),
            NumberOrText::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

/// Client for the geocoding service.
///
/// Use [`NominatimClient::new`] with the configured base URL; tests point it
/// at a wiremock server.
pub struct NominatimClient {
    client: Client,
    base_url: Url,
}

impl NominatimClient {
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

    /// Forward-geocodes `query` and returns the first result, if any.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Http`] / [`ServiceError::UnexpectedStatus`] on transport failure.
    /// - [`ServiceError::Deserialize`] if the body is not a JSON array of results.
    /// - [`ServiceError::Malformed`] if the first result's coordinates are unusable.
    pub async fn search_first(&self, query: &str) -> Result<Option<GeocodeHit>, ServiceError> {
        let url = self.search_url(query)?;
        let response = self.client.get(url).send().await?;
        let hits: Vec<RawSearchHit> =
            read_json(response, &format!("geocode search(q={query})")).await?;

        let Some(first) = hits.into_iter().next() else {
            return Ok(None);
        };

        let coordinate = first
            .lat
            .as_f64()
            .zip(first.lon.as_f64())
            .and_then(|(lat, lon)| Coordinate::new(lat, lon))
            .ok_or_else(|| ServiceError::Malformed {
                context: format!("geocode search(q={query})"),
                reason: format!("unusable coordinates {:?}/{:?}", first.lat, first.lon),
            })?;

        Ok(Some(GeocodeHit {
            coordinate,
            display_name: first.display_name,
        }))
    }

    /// Reverse-geocodes `coordinate`.
    ///
    /// Returns `Ok(None)` when the service answers without an `address`
    /// object (Nominatim does this for open sea and similar).
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Http`] / [`ServiceError::UnexpectedStatus`] on transport failure.
    /// - [`ServiceError::Deserialize`] if the body is not a JSON object.
    pub async fn reverse(
        &self,
        coordinate: Coordinate,
    ) -> Result<Option<ReverseAddress>, ServiceError> {
        let url = self.reverse_url(coordinate)?;
        let response = self.client.get(url).send().await?;
        let body: RawReverse = read_json(response, &format!("reverse geocode({coordinate})")).await?;
        Ok(body.address)
    }

    fn search_url(&self, query: &str) -> Result<Url, ServiceError> {
        let mut url = join(&self.base_url, "search")?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("q", query);
        Ok(url)
    }

    fn reverse_url(&self, coordinate: Coordinate) -> Result<Url, ServiceError> {
        let mut url = join(&self.base_url, "reverse")?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &coordinate.latitude.to_string())
            .append_pair("lon", &coordinate.longitude.to_string());
        Ok(url)
    }
}
