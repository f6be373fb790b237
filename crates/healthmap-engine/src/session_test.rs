use healthmap_core::{Coordinate, Place, PlaceId, PlaceKind, Route};

use super::*;
use crate::discovery::{DataSource, Discovery, FALLBACK_ADVISORY, MAX_PLACES};
use crate::error::{PositionError, ResolveError, RoutingError};
use crate::images::choose_image;
use crate::random::FixedRandom;
use crate::resolver::ResolvedLocation;

fn coord(latitude: f64, longitude: f64) -> Coordinate {
    Coordinate {
        latitude,
        longitude,
    }
}

fn place(id: i64, name: &str, kind: PlaceKind) -> Place {
    Place {
        id: PlaceId::Osm(id),
        name: name.to_owned(),
        kind,
        address: "Address details unavailable".to_owned(),
        coordinate: coord(1.0, 1.0),
        distance_km: 0.4,
        status: "Open".to_owned(),
        wait_time_label: "Unknown".to_owned(),
        occupancy_label: "Moderate".to_owned(),
        rating: 4.0,
        image: choose_image(name, kind, &FixedRandom::new(0.0)),
    }
}

fn location(name: &str, latitude: f64) -> ResolvedLocation {
    ResolvedLocation {
        coordinate: coord(latitude, 0.0),
        display_name: name.to_owned(),
    }
}

fn live(places: Vec<Place>) -> Discovery {
    Discovery {
        places,
        source: DataSource::Live,
    }
}

fn route() -> Route {
    Route {
        polyline: vec![coord(0.0, 0.0), coord(0.01, 0.01)],
        duration_minutes: 4,
        distance_km: 1.6,
    }
}

fn ready_session() -> NearbySession {
    let mut session = NearbySession::new();
    let ticket = session.begin_location_request();
    assert!(session.complete_location(
        ticket,
        location("Springfield", 10.0),
        live(vec![
            place(1, "General Hospital", PlaceKind::Hospital),
            place(2, "Fresh Mart", PlaceKind::Grocery),
        ]),
    ));
    session
}

#[test]
fn new_session_is_idle_without_origin() {
    let session = NearbySession::new();
    assert_eq!(session.state().status, SessionStatus::Idle);
    assert!(session.state().origin.is_none());
    assert!(session.state().places.is_empty());
}

#[test]
fn begin_location_request_moves_to_loading() {
    let mut session = NearbySession::new();
    let first = session.begin_location_request();
    let second = session.begin_location_request();
    assert_eq!(session.state().status, SessionStatus::Loading);
    assert!(second.seq() > first.seq());
}

#[test]
fn complete_location_sets_ready_state() {
    let session = ready_session();
    let state = session.state();
    assert_eq!(state.status, SessionStatus::Ready);
    assert_eq!(state.origin, Some(coord(10.0, 0.0)));
    assert_eq!(state.display_name, "Springfield");
    assert_eq!(state.places.len(), 2);
    assert!(state.live_data);
    assert!(state.advisory.is_none());
}

#[test]
fn fallback_discovery_is_ready_with_advisory() {
    let mut session = NearbySession::new();
    let ticket = session.begin_location_request();
    let discovery = Discovery {
        places: vec![place(1, "Demo", PlaceKind::Hospital)],
        source: DataSource::Fallback,
    };
    assert!(session.complete_location(ticket, location("", 0.0), discovery));
    assert_eq!(session.state().status, SessionStatus::Ready);
    assert_eq!(session.state().advisory.as_deref(), Some(FALLBACK_ADVISORY));
    assert!(!session.state().live_data);
}

#[test]
fn places_are_capped() {
    let mut session = NearbySession::new();
    let ticket = session.begin_location_request();
    let places = (0..20)
        .map(|i| place(i, &format!("H{i}"), PlaceKind::Hospital))
        .collect();
    session.complete_location(ticket, location("X", 0.0), live(places));
    assert_eq!(session.state().places.len(), MAX_PLACES);
    assert_eq!(session.state().places[0].id, PlaceId::Osm(0));
}

#[test]
fn stale_completion_after_newer_ready_is_a_no_op() {
    let mut session = NearbySession::new();
    let first = session.begin_location_request();
    let second = session.begin_location_request();

    assert!(session.complete_location(
        second,
        location("Newer", 2.0),
        live(vec![place(2, "Newer Hospital", PlaceKind::Hospital)]),
    ));
    let before = session.state().clone();

    assert!(!session.complete_location(
        first,
        location("Older", 1.0),
        live(vec![place(1, "Older Hospital", PlaceKind::Hospital)]),
    ));
    assert_eq!(session.state(), &before);

    let err = ResolveError::NotFound {
        query: "older".to_owned(),
    };
    assert!(!session.fail_location(first, &err));
    assert_eq!(session.state(), &before);
}

#[test]
fn resolver_failure_clears_coordinate() {
    let mut session = ready_session();
    let ticket = session.begin_location_request();
    let err = ResolveError::PermissionDenied(PositionError::PermissionDenied);
    assert!(session.fail_location(ticket, &err));

    let state = session.state();
    assert_eq!(
        state.status,
        SessionStatus::Error("Unable to retrieve your location.".to_owned())
    );
    assert!(state.origin.is_none());
    assert!(state.places.is_empty());
    assert!(state.route.is_none());
}

#[test]
fn routing_failure_keeps_places_and_origin() {
    let mut session = ready_session();
    let before = session.state().clone();

    let (ticket, origin) = session.begin_route().unwrap();
    assert_eq!(origin, coord(10.0, 0.0));
    assert!(session.complete_route(
        ticket,
        Err(RoutingError::NoRoute {
            code: "NoRoute".to_owned()
        })
    ));

    let state = session.state();
    assert_eq!(state.places, before.places);
    assert_eq!(state.origin, before.origin);
    assert_eq!(state.status, SessionStatus::Ready);
    assert_eq!(state.route_advisory.as_deref(), Some("Could not calculate route."));
    assert!(state.advisory.is_none());
}

#[test]
fn routing_failure_keeps_previous_route() {
    let mut session = ready_session();
    let (ticket, _) = session.begin_route().unwrap();
    session.complete_route(ticket, Ok(route()));

    let (ticket, _) = session.begin_route().unwrap();
    session.complete_route(
        ticket,
        Err(RoutingError::NoRoute {
            code: "NoRoute".to_owned(),
        }),
    );
    assert_eq!(session.state().route, Some(route()));
}

#[test]
fn route_success_clears_only_routing_advisory() {
    let mut session = ready_session();
    let (ticket, _) = session.begin_route().unwrap();
    session.complete_route(
        ticket,
        Err(RoutingError::NoRoute {
            code: "NoRoute".to_owned(),
        }),
    );
    let (ticket, _) = session.begin_route().unwrap();
    session.complete_route(ticket, Ok(route()));
    assert!(session.state().route_advisory.is_none());
    assert!(session.state().advisory.is_none());

    let mut demo = NearbySession::new();
    let ticket = demo.begin_location_request();
    demo.complete_location(
        ticket,
        location("", 0.0),
        Discovery {
            places: vec![],
            source: DataSource::Fallback,
        },
    );
    let (ticket, _) = demo.begin_route().unwrap();
    demo.complete_route(ticket, Ok(route()));
    assert_eq!(demo.state().advisory.as_deref(), Some(FALLBACK_ADVISORY));
}

#[test]
fn demo_advisory_survives_failed_then_successful_route() {
    let mut session = NearbySession::new();
    let ticket = session.begin_location_request();
    session.complete_location(
        ticket,
        location("", 0.0),
        Discovery {
            places: vec![place(1, "Demo Hospital", PlaceKind::Hospital)],
            source: DataSource::Fallback,
        },
    );

    let (ticket, _) = session.begin_route().unwrap();
    session.complete_route(
        ticket,
        Err(RoutingError::NoRoute {
            code: "NoRoute".to_owned(),
        }),
    );
    let state = session.state();
    assert_eq!(state.advisory.as_deref(), Some(FALLBACK_ADVISORY));
    assert_eq!(state.route_advisory.as_deref(), Some("Could not calculate route."));

    let (ticket, _) = session.begin_route().unwrap();
    session.complete_route(ticket, Ok(route()));
    let state = session.state();
    assert_eq!(state.advisory.as_deref(), Some(FALLBACK_ADVISORY));
    assert!(state.route_advisory.is_none());
    assert!(!state.live_data);
    assert_eq!(state.route, Some(route()));
}

#[test]
fn new_location_clears_route_advisory() {
    let mut session = ready_session();
    let (ticket, _) = session.begin_route().unwrap();
    session.complete_route(
        ticket,
        Err(RoutingError::NoRoute {
            code: "NoRoute".to_owned(),
        }),
    );
    assert!(session.state().route_advisory.is_some());

    let ticket = session.begin_location_request();
    session.complete_location(
        ticket,
        location("Elsewhere", 1.0),
        Discovery {
            places: vec![],
            source: DataSource::Live,
        },
    );
    assert!(session.state().route_advisory.is_none());
}

#[test]
fn new_location_clears_route_and_invalidates_in_flight_route() {
    let mut session = ready_session();
    let (first_route, _) = session.begin_route().unwrap();
    session.complete_route(first_route, Ok(route()));
    assert!(session.state().route.is_some());

    let (in_flight, _) = session.begin_route().unwrap();
    let ticket = session.begin_location_request();
    session.complete_location(ticket, location("Elsewhere", 5.0), live(vec![]));
    assert!(session.state().route.is_none());

    assert!(!session.complete_route(in_flight, Ok(route())));
    assert!(session.state().route.is_none());
}

#[test]
fn begin_route_requires_ready_origin() {
    let mut idle = NearbySession::new();
    assert!(idle.begin_route().is_none());

    let mut loading = ready_session();
    loading.begin_location_request();
    assert!(loading.begin_route().is_none());
}

#[test]
fn search_records_history_entry() {
    let mut session = NearbySession::new();
    let ticket = session.begin_location_request();
    assert!(session.complete_search(ticket, "springfield, il", location("Springfield", 1.0), live(vec![])));
    assert_eq!(
        session.state().last_search,
        Some(SearchRecord {
            query: "springfield, il".to_owned(),
            page: "nearby".to_owned(),
            title: "Location: Springfield".to_owned(),
        })
    );
}

#[test]
fn places_of_kind_filters_in_order() {
    let session = ready_session();
    let hospitals: Vec<_> = session
        .state()
        .places_of_kind(PlaceKind::Hospital)
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(hospitals, vec!["General Hospital"]);
    assert_eq!(
        session.state().place(PlaceId::Osm(2)).map(|p| p.name.as_str()),
        Some("Fresh Mart")
    );
    assert!(session.state().place(PlaceId::Demo(2)).is_none());
}
