//! Turns a device position or a free-text query into a coordinate plus a
//! display name.

use healthmap_core::Coordinate;

use crate::error::{PositionError, ResolveError};
use crate::geocode::NominatimClient;

/// Display name used when reverse geocoding finds an address without any
/// recognisable locality.
pub const UNNAMED_LOCALITY: &str = "Your location";

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    /// Human-readable area name; empty when none could be determined.
    pub display_name: String,
}

pub struct LocationResolver {
    geocoder: NominatimClient,
}

impl LocationResolver {
    #[must_use]
    pub fn new(geocoder: NominatimClient) -> Self {
        Self { geocoder }
    }

    /// Resolves a position reported by the device.
    ///
    /// Naming is best-effort: a failed reverse lookup still yields the
    /// coordinate, with an empty display name.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::PermissionDenied`] when the device reported no
    /// position or an out-of-range one.
    pub async fn from_device(
        &self,
        position: Result<Coordinate, PositionError>,
    ) -> Result<ResolvedLocation, ResolveError> {
        let coordinate = position.map_err(ResolveError::PermissionDenied)?;
        if !coordinate.is_valid() {
            tracing::warn!(%coordinate, "device reported an out-of-range position");
            return Err(ResolveError::PermissionDenied(PositionError::Unavailable));
        }

        let display_name = match self.geocoder.reverse(coordinate).await {
            Ok(Some(address)) => address.locality().unwrap_or(UNNAMED_LOCALITY).to_owned(),
            Ok(None) => String::new(),
            Err(e) => {
                tracing::warn!(
                    lat = coordinate.latitude,
                    lon = coordinate.longitude,
                    error = %e,
                    "reverse geocode failed; continuing without a display name"
                );
                String::new()
            }
        };

        Ok(ResolvedLocation {
            coordinate,
            display_name,
        })
    }

    /// Resolves a free-text place query using the first geocoding result.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::NotFound`] when the service returns no results.
    /// - [`ResolveError::ResolutionFailed`] on transport or parse failure.
    pub async fn from_text(&self, query: &str) -> Result<ResolvedLocation, ResolveError> {
        let hit = self
            .geocoder
            .search_first(query)
            .await
            .map_err(|e| {
                tracing::warn!(query, error = %e, "forward geocode failed");
                ResolveError::ResolutionFailed(e)
            })?
            .ok_or_else(|| ResolveError::NotFound {
                query: query.to_owned(),
            })?;

        Ok(ResolvedLocation {
            display_name: hit.short_name().to_owned(),
            coordinate: hit.coordinate,
        })
    }
}
