//! Demonstration places shown when live map data is unavailable.

use healthmap_core::{haversine_km, Coordinate, Place, PlaceId, PlaceKind};

use crate::images::choose_image;
use crate::random::RandomSource;

struct DemoPlace {
    id: u32,
    name: &'static str,
    kind: PlaceKind,
    /// Kind used for the image lookup. Differs from `kind` for the pharmacy
    /// entry, which is listed as a grocery but pictured as a pharmacy.
    image_kind: PlaceKind,
    image_name: &'static str,
    status: &'static str,
    wait_time: &'static str,
    occupancy: &'static str,
    rating: f64,
    address: &'static str,
    d_lat: f64,
    d_lon: f64,
}

const DEMO_PLACES: [DemoPlace; 3] = [
    DemoPlace {
        id: 1,
        name: "City General Hospital (Demo)",
        kind: PlaceKind::Hospital,
        image_kind: PlaceKind::Hospital,
        image_name: "City General Hospital",
        status: "Open 24/7",
        wait_time: "15 min",
        occupancy: "Moderate",
        rating: 4.8,
        address: "123 Health Ave",
        d_lat: 0.005,
        d_lon: 0.005,
    },
    DemoPlace {
        id: 2,
        name: "GreenCross Pharmacy (Demo)",
        kind: PlaceKind::Grocery,
        image_kind: PlaceKind::Hospital,
        image_name: "GreenCross Pharmacy",
        status: "Closes 10 PM",
        wait_time: "No wait",
        occupancy: "Low",
        rating: 4.5,
        address: "45 Market St",
        d_lat: -0.003,
        d_lon: 0.004,
    },
    DemoPlace {
        id: 3,
        name: "Elite Dental Care (Demo)",
        kind: PlaceKind::Hospital,
        image_kind: PlaceKind::Hospital,
        image_name: "Elite Dental Care",
        status: "Open via Appt",
        wait_time: "1h 20m",
        occupancy: "High",
        rating: 4.9,
        address: "88 Smile Rd",
        d_lat: 0.002,
        d_lon: -0.006,
    },
];

/// Builds the fixed demonstration set around `origin`.
///
/// Every record carries a [`PlaceId::Demo`] ID so it can never be mistaken
/// for live data.
pub(crate) fn demo_places(origin: Coordinate, random: &dyn RandomSource) -> Vec<Place> {
    DEMO_PLACES
        .iter()
        .map(|demo| {
            let coordinate = origin.offset(demo.d_lat, demo.d_lon);
            Place {
                id: PlaceId::Demo(demo.id),
                name: demo.name.to_owned(),
                kind: demo.kind,
                address: demo.address.to_owned(),
                coordinate,
                distance_km: haversine_km(origin, coordinate),
                status: demo.status.to_owned(),
                wait_time_label: demo.wait_time.to_owned(),
                occupancy_label: demo.occupancy.to_owned(),
                rating: demo.rating,
                image: choose_image(demo.image_name, demo.image_kind, random),
            }
        })
        .collect()
}
