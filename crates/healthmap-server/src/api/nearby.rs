//! Stateless relay endpoints over the Nearby engine. The session itself lives
//! in the browser; each call here performs exactly one engine operation.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use healthmap_core::{Coordinate, Place, Route};
use healthmap_engine::{ResolveError, ResolvedLocation, RoutingError};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ReverseQuery {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct PlacesQuery {
    pub lat: f64,
    pub lon: f64,
    pub context: Option<String>,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RouteQuery {
    pub from_lat: f64,
    pub from_lon: f64,
    pub to_lat: f64,
    pub to_lon: f64,
}

#[derive(Debug, Serialize)]
pub(super) struct LocationItem {
    pub coordinate: Coordinate,
    pub display_name: String,
}

impl From<ResolvedLocation> for LocationItem {
    fn from(location: ResolvedLocation) -> Self {
        Self {
            coordinate: location.coordinate,
            display_name: location.display_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PlacesItem {
    pub places: Vec<Place>,
    pub live: bool,
    pub advisory: Option<&'static str>,
}

fn coordinate(request_id: &str, field: &str, lat: f64, lon: f64) -> Result<Coordinate, ApiError> {
    Coordinate::new(lat, lon).ok_or_else(|| {
        ApiError::new(
            request_id,
            "validation_error",
            format!("{field} must be a latitude in [-90, 90] and a longitude in [-180, 180]"),
        )
    })
}

fn map_resolve_error(request_id: String, error: &ResolveError) -> ApiError {
    let code = match error {
        ResolveError::NotFound { .. } => "not_found",
        ResolveError::ResolutionFailed(_) => {
            tracing::warn!(error = %error, "geocoding upstream failed");
            "upstream_error"
        }
        ResolveError::PermissionDenied(_) => "bad_request",
    };
    ApiError::new(request_id, code, error.user_message())
}

pub(super) async fn geocode(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<ApiResponse<LocationItem>>, ApiError> {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "query parameter q is required",
        ));
    }

    let location = state
        .services
        .resolver
        .from_text(query)
        .await
        .map_err(|e| map_resolve_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(location.into(), req_id.0)))
}

pub(super) async fn reverse(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ReverseQuery>,
) -> Result<Json<ApiResponse<LocationItem>>, ApiError> {
    let origin = coordinate(&req_id.0, "lat/lon", params.lat, params.lon)?;
    let location = state
        .services
        .resolver
        .from_device(Ok(origin))
        .await
        .map_err(|e| map_resolve_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(location.into(), req_id.0)))
}

pub(super) async fn places(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<PlacesQuery>,
) -> Result<Json<ApiResponse<PlacesItem>>, ApiError> {
    let origin = coordinate(&req_id.0, "lat/lon", params.lat, params.lon)?;
    let radius_km = params.radius_km.unwrap_or(state.radius_km);
    if !(radius_km.is_finite() && radius_km > 0.0) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "radius_km must be a positive number",
        ));
    }
    let context = params.context.as_deref().map(str::trim).unwrap_or_default();

    let discovery = state
        .services
        .discovery
        .discover(origin, radius_km, context)
        .await;

    let data = PlacesItem {
        live: discovery.is_live(),
        advisory: discovery.advisory(),
        places: discovery.places,
    };
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn route(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<RouteQuery>,
) -> Result<Json<ApiResponse<Route>>, ApiError> {
    let from = coordinate(&req_id.0, "from_lat/from_lon", params.from_lat, params.from_lon)?;
    let to = coordinate(&req_id.0, "to_lat/to_lon", params.to_lat, params.to_lon)?;

    let route = state
        .services
        .planner
        .route(from, to)
        .await
        .map_err(|e: RoutingError| {
            tracing::warn!(%from, %to, error = %e, "route planning failed");
            ApiError::new(req_id.0.clone(), "upstream_error", e.user_message())
        })?;

    Ok(Json(ApiResponse::new(route, req_id.0)))
}
