//! Place discovery: live map-data lookup with a demonstration fallback.
//!
//! A failed lookup is never an error for the caller. Transport, timeout, and
//! parse failures are logged and replaced by a small fixed set of demo places
//! plus an advisory. An empty but well-formed response stays empty.

mod fallback;
mod normalize;
pub mod overpass;

use std::sync::Arc;

use healthmap_core::{Coordinate, Place};

pub use overpass::{build_query, OverpassClient, OverpassElement, OverpassResponse};

use crate::random::RandomSource;

/// Search radius used when none is configured.
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Upper bound on the number of places kept from one response and held by a
/// session.
pub const MAX_PLACES: usize = 15;

/// Advisory attached to demonstration results.
pub const FALLBACK_ADVISORY: &str = "Live data unavailable. Showing demo results.";

/// Where a [`Discovery`]'s places came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    Fallback,
}

/// Result of one discovery call. Always carries a usable place list.
#[derive(Debug, Clone, PartialEq)]
pub struct Discovery {
    pub places: Vec<Place>,
    pub source: DataSource,
}

impl Discovery {
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.source == DataSource::Live
    }

    /// Non-fatal notice for the user, present only for fallback data.
    #[must_use]
    pub fn advisory(&self) -> Option<&'static str> {
        match self.source {
            DataSource::Live => None,
            DataSource::Fallback => Some(FALLBACK_ADVISORY),
        }
    }
}

pub struct PlaceDiscovery {
    client: OverpassClient,
    random: Arc<dyn RandomSource>,
}

impl PlaceDiscovery {
    #[must_use]
    pub fn new(client: OverpassClient, random: Arc<dyn RandomSource>) -> Self {
        Self { client, random }
    }

    /// Finds hospitals and supermarkets within `radius_km` of `origin`.
    ///
    /// Places keep the service's response order, elements without a usable
    /// coordinate are dropped, and at most [`MAX_PLACES`] are
    /// returned. `context_name` feeds the `"Near ..."` address fallback.
    pub async fn discover(&self, origin: Coordinate, radius_km: f64, context_name: &str) -> Discovery {
        match self.client.fetch_elements(origin, radius_km).await {
            Ok(elements) => {
                let places = normalize_all(&elements, origin, context_name, self.random.as_ref());
                tracing::debug!(
                    elements = elements.len(),
                    places = places.len(),
                    "live discovery complete"
                );
                Discovery {
                    places,
                    source: DataSource::Live,
                }
            }
            Err(e) => {
                tracing::warn!(
                    lat = origin.latitude,
                    lon = origin.longitude,
                    error = %e,
                    "map data lookup failed; using demo places"
                );
                Discovery {
                    places: fallback::demo_places(origin, self.random.as_ref()),
                    source: DataSource::Fallback,
                }
            }
        }
    }
}

fn normalize_all(
    elements: &[OverpassElement],
    origin: Coordinate,
    context_name: &str,
    random: &dyn RandomSource,
) -> Vec<Place> {
    elements
        .iter()
        .filter_map(|el| normalize::normalize_element(el, origin, context_name, random))
        .take(MAX_PLACES)
        .collect()
}
