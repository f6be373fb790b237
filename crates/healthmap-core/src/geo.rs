//! Great-circle geometry on WGS84 latitude/longitude pairs.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by every distance in the engine.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees, latitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// Latitude must lie in `[-90, 90]` and longitude in `[-180, 180]`.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let candidate = Self {
            latitude,
            longitude,
        };
        candidate.is_valid().then_some(candidate)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Shifts the coordinate by the given deltas in degrees.
    ///
    /// Latitude is clamped to the poles and longitude wraps across the
    /// antimeridian, so the result stays in range.
    #[must_use]
    pub fn offset(&self, d_lat: f64, d_lon: f64) -> Self {
        Self {
            latitude: (self.latitude + d_lat).clamp(-90.0, 90.0),
            longitude: wrap_longitude(self.longitude + d_lon),
        }
    }
}

/// Maps any finite longitude into `[-180, 180]`. In-range values, including
/// both edges, are returned unchanged.
fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        longitude
    } else {
        (longitude + 180.0).rem_euclid(360.0) - 180.0
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// Great-circle distance in kilometers between `a` and `b`.
///
/// Half-angle haversine in `atan2` form with a 6371 km Earth radius. The
/// result is symmetric in its arguments and exactly `0.0` for identical points.
#[must_use]
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin() * (d_lon / 2.0).sin();
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Rounds to one decimal place, the precision distances are displayed at.
#[must_use]
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
