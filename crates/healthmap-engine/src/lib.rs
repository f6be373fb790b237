//! Location discovery and routing engine behind the "Nearby Services" view.
//!
//! Resolves a device position or free-text query to a coordinate, discovers
//! hospitals and supermarkets around it, and plans driving routes to a
//! selected place. [`Nearby`] ties the pieces together around a single
//! [`NearbySession`].

pub mod discovery;
pub mod error;
pub mod geocode;
mod http;
pub mod images;
pub mod nearby;
pub mod random;
pub mod resolver;
pub mod routing;
pub mod session;

pub use discovery::{
    DataSource, Discovery, OverpassClient, PlaceDiscovery, DEFAULT_RADIUS_KM, MAX_PLACES,
};
pub use error::{PositionError, ResolveError, RoutingError, ServiceError};
pub use geocode::{GeocodeHit, NominatimClient, ReverseAddress};
pub use images::choose_image;
pub use nearby::{Nearby, Outcome, Services};
pub use random::{FixedRandom, RandomSource, ThreadRandom};
pub use resolver::{LocationResolver, ResolvedLocation};
pub use routing::{OsrmClient, RoutePlanner};
pub use session::{
    NearbySession, NearbySessionState, RequestTicket, RouteTicket, SearchRecord, SessionStatus,
};
