//! Converts raw map-data elements into uniform [`Place`] records.

use healthmap_core::{haversine_km, round_to_tenth, Coordinate, Place, PlaceId, PlaceKind};

use super::overpass::OverpassElement;
use crate::images::choose_image;
use crate::random::RandomSource;

pub(crate) const ADDRESS_UNAVAILABLE: &str = "Address details unavailable";

/// Normalizes one element, or drops it when no coordinate can be found.
pub(crate) fn normalize_element(
    element: &OverpassElement,
    origin: Coordinate,
    context_name: &str,
    random: &dyn RandomSource,
) -> Option<Place> {
    let coordinate = element.coordinate()?;
    let kind = if element.tag("amenity") == Some("hospital") {
        PlaceKind::Hospital
    } else {
        PlaceKind::Grocery
    };
    let name = element
        .tag("name")
        .map_or_else(|| placeholder_name(kind).to_owned(), str::to_owned);
    let image = choose_image(&name, kind, random);

    Some(Place {
        id: PlaceId::Osm(element.id),
        address: resolve_address(element, context_name),
        distance_km: haversine_km(origin, coordinate),
        status: "Open".to_owned(),
        wait_time_label: match kind {
            PlaceKind::Hospital => "Unknown",
            PlaceKind::Grocery => "No wait",
        }
        .to_owned(),
        occupancy_label: "Moderate".to_owned(),
        rating: synthesize_rating(random),
        coordinate,
        image,
        name,
        kind,
    })
}

fn placeholder_name(kind: PlaceKind) -> &'static str {
    match kind {
        PlaceKind::Hospital => "Unnamed Hospital",
        PlaceKind::Grocery => "Unnamed Place",
    }
}

/// Best-effort postal address, most specific source first:
///
/// 1. `addr:full`
/// 2. `"{housenumber} {street}, {city}"`
/// 3. `"{suburb}, {city}"`
/// 4. `"{city}"`
/// 5. `"Near {context_name}"`
/// 6. [`ADDRESS_UNAVAILABLE`]
pub(crate) fn resolve_address(element: &OverpassElement, context_name: &str) -> String {
    if let Some(full) = element.tag("addr:full") {
        return full.to_owned();
    }

    let first_tag = |keys: &[&str]| keys.iter().find_map(|k| element.tag(k));
    let city = first_tag(&["addr:city", "addr:town", "addr:village"]);
    let suburb = first_tag(&["addr:suburb", "addr:district", "addr:neighbourhood"]);
    let with_city = |head: String| match city {
        Some(city) => format!("{head}, {city}"),
        None => head,
    };

    if let Some(street) = element.tag("addr:street") {
        let head = match element.tag("addr:housenumber") {
            Some(number) => format!("{number} {street}"),
            None => street.to_owned(),
        };
        return with_city(head);
    }
    if let Some(suburb) = suburb {
        return with_city(suburb.to_owned());
    }
    if let Some(city) = city {
        return city.to_owned();
    }

    let context_name = context_name.trim();
    if context_name.is_empty() {
        ADDRESS_UNAVAILABLE.to_owned()
    } else {
        format!("Near {context_name}")
    }
}

/// Display-only rating in `[3.0, 5.0]` at one decimal place. Not a real
/// rating; the map data has none.
pub(crate) fn synthesize_rating(random: &dyn RandomSource) -> f64 {
    round_to_tenth(3.0 + 2.0 * random.next_unit()).clamp(3.0, 5.0)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
