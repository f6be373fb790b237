//! The Nearby session state machine.
//!
//! `NearbySession` is a plain synchronous value. Every state change happens
//! through a `begin_*` / `complete_*` pair: `begin_*` hands out a ticket
//! carrying a sequence number, and `complete_*` applies a result only when
//! that ticket is still the newest one issued. A late completion for a
//! superseded request is dropped without touching the state.

use healthmap_core::{Coordinate, Place, PlaceId, PlaceKind, Route};
use serde::Serialize;

use crate::discovery::{Discovery, MAX_PLACES};
use crate::error::{ResolveError, RoutingError};
use crate::resolver::ResolvedLocation;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Carries the user-facing message.
    Error(String),
}

/// A successful free-text search, handed to the history store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRecord {
    pub query: String,
    pub page: String,
    pub title: String,
}

impl SearchRecord {
    fn for_location(query: &str, display_name: &str) -> Self {
        Self {
            query: query.to_owned(),
            page: "nearby".to_owned(),
            title: format!("Location: {display_name}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NearbySessionState {
    /// `None` until a location resolves, and again after a resolver failure.
    pub origin: Option<Coordinate>,
    pub display_name: String,
    /// Service response order.
    pub places: Vec<Place>,
    pub route: Option<Route>,
    pub status: SessionStatus,
    /// Discovery notice, set while the places are demo data.
    pub advisory: Option<String>,
    /// Set when the last directions request failed; cleared by a successful
    /// route or a new location.
    pub route_advisory: Option<String>,
    pub live_data: bool,
    pub last_search: Option<SearchRecord>,
}

impl NearbySessionState {
    /// Places of one kind, in list order.
    pub fn places_of_kind(&self, kind: PlaceKind) -> impl Iterator<Item = &Place> {
        self.places.iter().filter(move |p| p.kind == kind)
    }

    #[must_use]
    pub fn place(&self, id: PlaceId) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }
}

/// Ticket for a locate / search / pick request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
}

impl RequestTicket {
    #[must_use]
    pub fn seq(self) -> u64 {
        self.seq
    }
}

/// Ticket for a directions request. Also remembers which location it was
/// issued against, so a route computed for an old origin is never attached
/// to a newer place list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteTicket {
    seq: u64,
    location_seq: u64,
}

#[derive(Debug, Default)]
pub struct NearbySession {
    state: NearbySessionState,
    location_seq: u64,
    route_seq: u64,
}

impl NearbySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &NearbySessionState {
        &self.state
    }

    /// Starts a locate, search, or map-pick request, superseding any request
    /// still in flight.
    pub fn begin_location_request(&mut self) -> RequestTicket {
        self.location_seq += 1;
        self.state.status = SessionStatus::Loading;
        RequestTicket {
            seq: self.location_seq,
        }
    }

    fn is_current(&self, ticket: RequestTicket) -> bool {
        if ticket.seq == self.location_seq {
            return true;
        }
        tracing::debug!(
            seq = ticket.seq,
            latest = self.location_seq,
            "dropping stale location result"
        );
        false
    }

    /// Applies a resolved location and its discovery result. Any previous
    /// route is cleared.
    ///
    /// Returns `false` (and changes nothing) when the ticket is stale.
    pub fn complete_location(
        &mut self,
        ticket: RequestTicket,
        location: ResolvedLocation,
        mut discovery: Discovery,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        discovery.places.truncate(MAX_PLACES);
        let advisory = discovery.advisory().map(str::to_owned);
        let live_data = discovery.is_live();

        self.state.origin = Some(location.coordinate);
        self.state.display_name = location.display_name;
        self.state.places = discovery.places;
        self.state.route = None;
        self.state.status = SessionStatus::Ready;
        self.state.advisory = advisory;
        self.state.route_advisory = None;
        self.state.live_data = live_data;
        true
    }

    /// Like [`complete_location`](Self::complete_location), additionally
    /// recording the query for search history.
    pub fn complete_search(
        &mut self,
        ticket: RequestTicket,
        query: &str,
        location: ResolvedLocation,
        discovery: Discovery,
    ) -> bool {
        let record = SearchRecord::for_location(query, &location.display_name);
        if !self.complete_location(ticket, location, discovery) {
            return false;
        }
        self.state.last_search = Some(record);
        true
    }

    /// Moves to `Error` with no coordinate. Returns `false` when stale.
    pub fn fail_location(&mut self, ticket: RequestTicket, error: &ResolveError) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state.origin = None;
        self.state.display_name.clear();
        self.state.places.clear();
        self.state.route = None;
        self.state.advisory = None;
        self.state.route_advisory = None;
        self.state.live_data = false;
        self.state.status = SessionStatus::Error(error.user_message().to_owned());
        true
    }

    /// Starts a directions request from the current origin.
    ///
    /// Returns `None` unless the session is `Ready` with an origin.
    pub fn begin_route(&mut self) -> Option<(RouteTicket, Coordinate)> {
        if self.state.status != SessionStatus::Ready {
            return None;
        }
        let origin = self.state.origin?;
        self.route_seq += 1;
        Some((
            RouteTicket {
                seq: self.route_seq,
                location_seq: self.location_seq,
            },
            origin,
        ))
    }

    /// Attaches a new route, or on failure sets the routing advisory and
    /// leaves everything else (including any earlier route) untouched. The
    /// discovery advisory is never touched here.
    ///
    /// Returns `false` when the ticket was superseded by a newer route or
    /// location request.
    pub fn complete_route(&mut self, ticket: RouteTicket, result: Result<Route, RoutingError>) -> bool {
        if ticket.seq != self.route_seq || ticket.location_seq != self.location_seq {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.route_seq,
                "dropping stale route result"
            );
            return false;
        }
        match result {
            Ok(route) => {
                self.state.route = Some(route);
                self.state.route_advisory = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "route planning failed");
                self.state.route_advisory = Some(e.user_message().to_owned());
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
