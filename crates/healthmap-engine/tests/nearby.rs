//! End-to-end tests for the `Nearby` orchestrator against mocked upstreams.
//!
//! One wiremock server stands in for all three services: the geocoder at
//! `/search` and `/reverse`, map data at `/api/interpreter`, and routing under
//! `/route/v1/driving/`.

use std::sync::Arc;
use std::time::Duration;

use healthmap_core::{Coordinate, PlaceId, PlaceKind};
use healthmap_engine::discovery::FALLBACK_ADVISORY;
use healthmap_engine::routing::OsrmClient;
use healthmap_engine::{
    FixedRandom, LocationResolver, Nearby, NominatimClient, Outcome, OverpassClient,
    PlaceDiscovery, PositionError, RoutePlanner, Services, SessionStatus,
};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UA: &str = "healthmap-test/0.1";

fn coord(latitude: f64, longitude: f64) -> Coordinate {
    Coordinate {
        latitude,
        longitude,
    }
}

fn nearby(server: &MockServer) -> Nearby {
    let uri = server.uri();
    let services = Services {
        resolver: LocationResolver::new(NominatimClient::new(&uri, 5, UA).expect("geocoder")),
        discovery: PlaceDiscovery::new(
            OverpassClient::new(&format!("{uri}/api/interpreter"), 5, UA).expect("overpass"),
            Arc::new(FixedRandom::new(0.5)),
        ),
        planner: RoutePlanner::new(OsrmClient::new(&uri, 5, UA).expect("router")),
    };
    Nearby::new(services, 5.0)
}

async fn mount_reverse(server: &MockServer, city: &str) {
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "address": {"city": city}
        })))
        .mount(server)
        .await;
}

async fn mount_places(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "elements": [
                {"type": "node", "id": 101, "lat": 51.505, "lon": -0.12,
                 "tags": {"amenity": "hospital", "name": "Riverside Hospital",
                          "addr:housenumber": "5", "addr:street": "Bank St",
                          "addr:city": "London"}},
                {"type": "node", "id": 102},
                {"type": "way", "id": 103, "center": {"lat": 51.498, "lon": -0.125},
                 "tags": {"shop": "supermarket"}}
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_geocode(server: &MockServer, query: &str, lat: &str, lon: &str, name: &str) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"lat": lat, "lon": lon, "display_name": name}
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn locate_resolves_name_and_discovers_places() {
    let server = MockServer::start().await;
    mount_reverse(&server, "London").await;
    mount_places(&server).await;

    let nearby = nearby(&server);
    let outcome = nearby.locate(Ok(coord(51.5, -0.12))).await;
    assert_eq!(outcome, Outcome::Applied);

    let state = nearby.snapshot().await;
    assert_eq!(state.status, SessionStatus::Ready);
    assert_eq!(state.origin, Some(coord(51.5, -0.12)));
    assert_eq!(state.display_name, "London");
    assert!(state.live_data);
    assert!(state.advisory.is_none());

    // Element 102 has no coordinate and is dropped.
    let ids: Vec<_> = state.places.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![PlaceId::Osm(101), PlaceId::Osm(103)]);
    assert_eq!(state.places[0].address, "5 Bank St, London");
    assert_eq!(state.places[1].name, "Unnamed Place");
    assert_eq!(state.places[1].address, "Near London");
    assert!(state.places.iter().all(|p| p.distance_km >= 0.0));
    assert!((3.0..=5.0).contains(&state.places[0].rating));
    assert_eq!(state.places_of_kind(PlaceKind::Grocery).count(), 1);
}

#[tokio::test]
async fn locate_survives_reverse_geocode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_places(&server).await;

    let nearby = nearby(&server);
    nearby.locate(Ok(coord(51.5, -0.12))).await;

    let state = nearby.snapshot().await;
    assert_eq!(state.status, SessionStatus::Ready);
    assert_eq!(state.display_name, "");
    assert_eq!(state.places[1].address, "Address details unavailable");
}

#[tokio::test]
async fn permission_denied_moves_to_error() {
    let server = MockServer::start().await;
    let nearby = nearby(&server);

    let outcome = nearby.locate(Err(PositionError::PermissionDenied)).await;
    assert_eq!(outcome, Outcome::Applied);

    let state = nearby.snapshot().await;
    assert_eq!(
        state.status,
        SessionStatus::Error("Unable to retrieve your location.".to_owned())
    );
    assert!(state.origin.is_none());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn search_not_found_moves_to_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let nearby = nearby(&server);
    nearby.search("atlantis").await;

    let state = nearby.snapshot().await;
    assert_eq!(
        state.status,
        SessionStatus::Error("Location not found.".to_owned())
    );
    assert!(state.origin.is_none());
    assert!(state.places.is_empty());
}

#[tokio::test]
async fn search_transport_failure_moves_to_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let nearby = nearby(&server);
    nearby.search("springfield").await;

    assert_eq!(
        nearby.snapshot().await.status,
        SessionStatus::Error("Search failed.".to_owned())
    );
}

#[tokio::test]
async fn search_records_history_and_uses_short_name() {
    let server = MockServer::start().await;
    mount_geocode(
        &server,
        "westminster",
        "51.4975",
        "-0.1357",
        "Westminster, Greater London, England",
    )
    .await;
    mount_places(&server).await;

    let nearby = nearby(&server);
    assert_eq!(nearby.search("  westminster ").await, Outcome::Applied);

    let state = nearby.snapshot().await;
    assert_eq!(state.display_name, "Westminster");
    let record = state.last_search.expect("search recorded");
    assert_eq!(record.query, "westminster");
    assert_eq!(record.page, "nearby");
    assert_eq!(record.title, "Location: Westminster");
}

#[tokio::test]
async fn blank_search_is_ignored() {
    let server = MockServer::start().await;
    let nearby = nearby(&server);

    assert_eq!(nearby.search("   ").await, Outcome::Ignored);
    assert_eq!(nearby.snapshot().await.status, SessionStatus::Idle);
}

#[tokio::test]
async fn discovery_failure_falls_back_to_demo_places() {
    let server = MockServer::start().await;
    mount_reverse(&server, "London").await;
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(504))
        .mount(&server)
        .await;

    let nearby = nearby(&server);
    nearby.locate(Ok(coord(51.5, -0.12))).await;

    let state = nearby.snapshot().await;
    assert_eq!(state.status, SessionStatus::Ready);
    assert!(!state.live_data);
    assert_eq!(state.advisory.as_deref(), Some(FALLBACK_ADVISORY));
    assert_eq!(state.places.len(), 3);
    assert!(state.places.iter().all(|p| p.id.is_demo()));
}

#[tokio::test]
async fn unparseable_discovery_body_falls_back() {
    let server = MockServer::start().await;
    mount_reverse(&server, "London").await;
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let nearby = nearby(&server);
    nearby.locate(Ok(coord(51.5, -0.12))).await;

    let state = nearby.snapshot().await;
    assert!(!state.live_data);
    assert!(!state.places.is_empty());
}

#[tokio::test]
async fn empty_discovery_is_live_and_empty() {
    let server = MockServer::start().await;
    mount_reverse(&server, "Nowhere").await;
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"elements": []})))
        .mount(&server)
        .await;

    let nearby = nearby(&server);
    nearby.locate(Ok(coord(10.0, 10.0))).await;

    let state = nearby.snapshot().await;
    assert_eq!(state.status, SessionStatus::Ready);
    assert!(state.places.is_empty());
    assert!(state.live_data);
    assert!(state.advisory.is_none());
}

#[tokio::test]
async fn pick_keeps_previous_display_name_as_context() {
    let server = MockServer::start().await;
    mount_reverse(&server, "London").await;
    mount_places(&server).await;

    let nearby = nearby(&server);
    nearby.locate(Ok(coord(51.5, -0.12))).await;
    assert_eq!(nearby.pick(coord(51.51, -0.11), None).await, Outcome::Applied);

    let state = nearby.snapshot().await;
    assert_eq!(state.origin, Some(coord(51.51, -0.11)));
    assert_eq!(state.display_name, "London");
    assert_eq!(state.places[1].address, "Near London");

    // One reverse lookup for the locate, none for the pick.
    let reverse_calls = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/reverse")
        .count();
    assert_eq!(reverse_calls, 1);
}

#[tokio::test]
async fn pick_with_explicit_context_names_the_location() {
    let server = MockServer::start().await;
    mount_places(&server).await;

    let nearby = nearby(&server);
    assert_eq!(
        nearby.pick(coord(51.5, -0.12), Some("Lambeth")).await,
        Outcome::Applied
    );
    let state = nearby.snapshot().await;
    assert_eq!(state.display_name, "Lambeth");
    assert_eq!(state.places[1].address, "Near Lambeth");
}

#[tokio::test]
async fn pick_rejects_out_of_range_coordinate() {
    let server = MockServer::start().await;
    let nearby = nearby(&server);
    assert_eq!(nearby.pick(coord(95.0, 0.0), None).await, Outcome::Ignored);
    assert_eq!(nearby.snapshot().await.status, SessionStatus::Idle);
}

#[tokio::test]
async fn directions_attach_route() {
    let server = MockServer::start().await;
    mount_reverse(&server, "London").await;
    mount_places(&server).await;
    Mock::given(method("GET"))
        .and(path("/route/v1/driving/-0.12,51.5;-0.12,51.505"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "Ok",
            "routes": [{
                "geometry": {"coordinates": [[-0.12, 51.5], [-0.12, 51.505]]},
                "duration": 120.0,
                "distance": 560.0
            }]
        })))
        .mount(&server)
        .await;

    let nearby = nearby(&server);
    nearby.locate(Ok(coord(51.5, -0.12))).await;
    assert_eq!(nearby.directions_to(PlaceId::Osm(101)).await, Outcome::Applied);

    let route = nearby.snapshot().await.route.expect("route attached");
    assert_eq!(route.polyline, vec![coord(51.5, -0.12), coord(51.505, -0.12)]);
    assert_eq!(route.duration_minutes, 2);
    assert!((route.distance_km - 0.6).abs() < 1e-9);
}

#[tokio::test]
async fn directions_failure_only_sets_route_advisory() {
    let server = MockServer::start().await;
    mount_reverse(&server, "London").await;
    mount_places(&server).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/route/v1/driving/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": "NoRoute",
            "message": "Impossible route between points"
        })))
        .mount(&server)
        .await;

    let nearby = nearby(&server);
    nearby.locate(Ok(coord(51.5, -0.12))).await;
    let before = nearby.snapshot().await;

    assert_eq!(nearby.directions_to(PlaceId::Osm(103)).await, Outcome::Applied);

    let after = nearby.snapshot().await;
    assert_eq!(after.places, before.places);
    assert_eq!(after.origin, before.origin);
    assert_eq!(after.status, SessionStatus::Ready);
    assert!(after.route.is_none());
    assert_eq!(after.route_advisory.as_deref(), Some("Could not calculate route."));
    assert!(after.advisory.is_none());
}

#[tokio::test]
async fn directions_without_origin_or_to_unknown_place_are_ignored() {
    let server = MockServer::start().await;
    let nearby = nearby(&server);
    assert_eq!(nearby.directions(coord(1.0, 1.0)).await, Outcome::Ignored);
    assert_eq!(nearby.directions_to(PlaceId::Demo(1)).await, Outcome::Ignored);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn slow_superseded_search_does_not_overwrite_newer_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "slowtown"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([
                    {"lat": "10.0", "lon": "10.0", "display_name": "Slowtown, Far Away"}
                ]))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    mount_geocode(&server, "fastville", "20.0", "20.0", "Fastville, Nearby").await;
    mount_places(&server).await;

    let nearby = nearby(&server);
    let (slow, fast) = tokio::join!(nearby.search("slowtown"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        nearby.search("fastville").await
    });

    assert_eq!(fast, Outcome::Applied);
    assert_eq!(slow, Outcome::Superseded);

    let state = nearby.snapshot().await;
    assert_eq!(state.display_name, "Fastville");
    assert_eq!(state.origin, Some(coord(20.0, 20.0)));
    assert_eq!(
        state.last_search.map(|r| r.query).as_deref(),
        Some("fastville")
    );
}
