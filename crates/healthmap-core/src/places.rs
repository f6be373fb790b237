//! Point-of-interest records produced by place discovery.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Category of a discovered place.
///
/// Drives marker styling, the image bucket, and which tab the place is
/// listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceKind {
    Hospital,
    Grocery,
}

impl PlaceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PlaceKind::Hospital => "Hospital",
            PlaceKind::Grocery => "Grocery",
        }
    }
}

impl std::fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlaceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hospital" => Ok(PlaceKind::Hospital),
            "grocery" => Ok(PlaceKind::Grocery),
            other => Err(format!("unknown place kind: {other}")),
        }
    }
}

/// Identifier of a place.
///
/// Live records carry the map-data element ID; demonstration records carry a
/// small local counter. The two never compare equal because the variant is
/// part of the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", content = "id", rename_all = "snake_case")]
pub enum PlaceId {
    Osm(i64),
    Demo(u32),
}

impl PlaceId {
    #[must_use]
    pub fn is_demo(self) -> bool {
        matches!(self, PlaceId::Demo(_))
    }
}

impl std::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaceId::Osm(id) => write!(f, "osm:{id}"),
            PlaceId::Demo(id) => write!(f, "demo:{id}"),
        }
    }
}

/// Image bucket chosen for a place card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageBucket {
    HospitalDefault,
    Dental,
    Eye,
    Pharmacy,
    GroceryDefault,
    Produce,
    Vegetable,
    Convenience,
}

/// Representative image for a place card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub bucket: ImageBucket,
    pub url: &'static str,
}

/// One point of interest, normalized from live map data or synthesized as a
/// demonstration record.
///
/// `status`, `wait_time_label`, `occupancy_label` and `rating` are display
/// affordances only. The upstream data almost never carries them, so they are
/// placeholders or, for `rating`, a random value in `[3.0, 5.0]`. They are not
/// real service-quality data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub kind: PlaceKind,
    pub address: String,
    pub coordinate: Coordinate,
    /// Haversine distance from the query origin, computed locally.
    pub distance_km: f64,
    pub status: String,
    pub wait_time_label: String,
    pub occupancy_label: String,
    pub rating: f64,
    pub image: ImageRef,
}

impl Place {
    #[must_use]
    pub fn is_demo(&self) -> bool {
        self.id.is_demo()
    }
}
