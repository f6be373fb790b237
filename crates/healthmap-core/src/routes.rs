use serde::Serialize;

use crate::geo::Coordinate;

/// A driving route from the session origin to a selected place.
///
/// Each directions request produces a fresh `Route`; routes are replaced
/// wholesale, never merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Path vertices in latitude-first order.
    pub polyline: Vec<Coordinate>,
    pub duration_minutes: u32,
    /// Kilometers, rounded to one decimal place.
    pub distance_km: f64,
}
