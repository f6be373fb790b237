//! Plain-text rendering of a session snapshot.

use healthmap_core::{Place, PlaceKind};
use healthmap_engine::NearbySessionState;

/// Prints the origin, advisory and place table, returning the listed places
/// in printed order so `--directions N` can index into them.
pub(crate) fn print_places(state: &NearbySessionState, kind: Option<PlaceKind>) -> Vec<Place> {
    if let Some(origin) = state.origin {
        let name = if state.display_name.is_empty() {
            "(unnamed)"
        } else {
            state.display_name.as_str()
        };
        println!("Location: {name} [{origin}]");
    }
    if let Some(advisory) = &state.advisory {
        println!("Note: {advisory}");
    }

    let listed: Vec<Place> = match kind {
        Some(kind) => state.places_of_kind(kind).cloned().collect(),
        None => state.places.clone(),
    };

    if listed.is_empty() {
        println!("no places found");
        return listed;
    }

    println!();
    println!(
        "{:<4}{:<36}{:<10}{:>8}  {:<7}ADDRESS",
        "#", "NAME", "KIND", "KM", "RATING"
    );
    for (i, place) in listed.iter().enumerate() {
        println!(
            "{:<4}{:<36}{:<10}{:>8.1}  {:<7.1}{}",
            i + 1,
            truncate(&place.name, 34),
            place.kind.as_str(),
            place.distance_km,
            place.rating,
            place.address
        );
    }
    listed
}

pub(crate) fn print_route(state: &NearbySessionState) {
    match &state.route {
        Some(route) => println!(
            "{} min, {:.1} km ({} points)",
            route.duration_minutes,
            route.distance_km,
            route.polyline.len()
        ),
        None => println!(
            "{}",
            state.route_advisory.as_deref().unwrap_or("no route available")
        ),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars - 3).collect::<String>())
    } else {
        text.to_owned()
    }
}
