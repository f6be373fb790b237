//! The orchestrator: turns user actions into resolver, discovery, and routing
//! calls and feeds their results through a single [`NearbySession`].

use std::sync::Arc;

use healthmap_core::{AppConfig, Coordinate, PlaceId};
use tokio::sync::Mutex;

use crate::discovery::{OverpassClient, PlaceDiscovery};
use crate::error::{PositionError, ServiceError};
use crate::geocode::NominatimClient;
use crate::random::RandomSource;
use crate::resolver::{LocationResolver, ResolvedLocation};
use crate::routing::{OsrmClient, RoutePlanner};
use crate::session::{NearbySession, NearbySessionState};

/// What happened to the session as a result of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The result was applied to the session.
    Applied,
    /// A newer request was issued while this one was in flight; its result
    /// was discarded.
    Superseded,
    /// The action did not apply to the current state and made no request.
    Ignored,
}

impl From<bool> for Outcome {
    fn from(applied: bool) -> Self {
        if applied {
            Outcome::Applied
        } else {
            Outcome::Superseded
        }
    }
}

/// The stateless engine components, shared by the orchestrator and the HTTP
/// relay.
pub struct Services {
    pub resolver: LocationResolver,
    pub discovery: PlaceDiscovery,
    pub planner: RoutePlanner,
}

impl Services {
    /// Builds the three service clients from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if an HTTP client cannot be constructed or a
    /// configured URL does not parse.
    pub fn from_app_config(
        config: &AppConfig,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, ServiceError> {
        let timeout = config.request_timeout_secs;
        let user_agent = config.user_agent.as_str();

        let geocoder = NominatimClient::new(&config.geocoder_url, timeout, user_agent)?;
        let overpass = OverpassClient::new(&config.overpass_url, timeout, user_agent)?;
        let router = OsrmClient::new(&config.router_url, timeout, user_agent)?;

        Ok(Self {
            resolver: LocationResolver::new(geocoder),
            discovery: PlaceDiscovery::new(overpass, random),
            planner: RoutePlanner::new(router),
        })
    }
}

/// One Nearby view's worth of state plus the services that drive it.
///
/// The session lock is never held across a network call: each action takes a
/// ticket, releases the lock, awaits its I/O, then re-locks to apply the
/// result. Concurrent actions therefore race freely and the session keeps
/// whichever was issued last.
pub struct Nearby {
    services: Services,
    radius_km: f64,
    session: Mutex<NearbySession>,
}

impl Nearby {
    #[must_use]
    pub fn new(services: Services, radius_km: f64) -> Self {
        Self {
            services,
            radius_km,
            session: Mutex::new(NearbySession::new()),
        }
    }

    /// # Errors
    ///
    /// See [`Services::from_app_config`].
    pub fn from_app_config(
        config: &AppConfig,
        random: Arc<dyn RandomSource>,
    ) -> Result<Self, ServiceError> {
        let services = Services::from_app_config(config, random)?;
        Ok(Self::new(services, config.search_radius_km))
    }

    /// A copy of the current session state.
    pub async fn snapshot(&self) -> NearbySessionState {
        self.session.lock().await.state().clone()
    }

    /// "Locate me": resolve the device position, then discover around it.
    pub async fn locate(&self, position: Result<Coordinate, PositionError>) -> Outcome {
        let ticket = self.session.lock().await.begin_location_request();
        tracing::info!(seq = ticket.seq(), "locate requested");

        match self.services.resolver.from_device(position).await {
            Ok(location) => {
                let discovery = self
                    .services
                    .discovery
                    .discover(location.coordinate, self.radius_km, &location.display_name)
                    .await;
                let mut session = self.session.lock().await;
                session.complete_location(ticket, location, discovery).into()
            }
            Err(e) => {
                tracing::warn!(seq = ticket.seq(), error = %e, "device location failed");
                self.session.lock().await.fail_location(ticket, &e).into()
            }
        }
    }

    /// Free-text search. A blank query is ignored.
    pub async fn search(&self, query: &str) -> Outcome {
        let query = query.trim();
        if query.is_empty() {
            return Outcome::Ignored;
        }
        let ticket = self.session.lock().await.begin_location_request();
        tracing::info!(seq = ticket.seq(), query, "search requested");

        match self.services.resolver.from_text(query).await {
            Ok(location) => {
                let discovery = self
                    .services
                    .discovery
                    .discover(location.coordinate, self.radius_km, &location.display_name)
                    .await;
                let mut session = self.session.lock().await;
                session
                    .complete_search(ticket, query, location, discovery)
                    .into()
            }
            Err(e) => {
                tracing::info!(seq = ticket.seq(), query, error = %e, "search did not resolve");
                self.session.lock().await.fail_location(ticket, &e).into()
            }
        }
    }

    /// Map click: discover around `coordinate` without geocoding.
    ///
    /// The address context is `context` when given, otherwise the current
    /// display name, which the new location keeps.
    pub async fn pick(&self, coordinate: Coordinate, context: Option<&str>) -> Outcome {
        if !coordinate.is_valid() {
            return Outcome::Ignored;
        }
        let (ticket, context) = {
            let mut session = self.session.lock().await;
            let context = context.map_or_else(|| session.state().display_name.clone(), str::to_owned);
            (session.begin_location_request(), context)
        };
        tracing::info!(seq = ticket.seq(), %coordinate, "map location picked");

        let discovery = self
            .services
            .discovery
            .discover(coordinate, self.radius_km, &context)
            .await;
        let location = ResolvedLocation {
            coordinate,
            display_name: context,
        };
        let mut session = self.session.lock().await;
        session.complete_location(ticket, location, discovery).into()
    }

    /// Plans a route from the current origin. Ignored while no origin is
    /// resolved or a location request is loading.
    pub async fn directions(&self, destination: Coordinate) -> Outcome {
        let Some((ticket, origin)) = self.session.lock().await.begin_route() else {
            return Outcome::Ignored;
        };
        let result = self.services.planner.route(origin, destination).await;
        self.session.lock().await.complete_route(ticket, result).into()
    }

    /// Directions to a place in the current list. Ignored for unknown IDs.
    pub async fn directions_to(&self, id: PlaceId) -> Outcome {
        let destination = {
            let session = self.session.lock().await;
            session.state().place(id).map(|p| p.coordinate)
        };
        match destination {
            Some(destination) => self.directions(destination).await,
            None => Outcome::Ignored,
        }
    }
}
