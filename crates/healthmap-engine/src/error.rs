use thiserror::Error;

/// Failure talking to one of the external services (geocoder, map data,
/// routing).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body parsed but carried values the engine cannot use.
    #[error("malformed response for {context}: {reason}")]
    Malformed { context: String, reason: String },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Why the device could not report a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    Unavailable,
    #[error("geolocation unsupported")]
    Unsupported,
}

/// Failure to turn a device position or a text query into a coordinate.
///
/// Every variant is fatal to the request that produced it: the session moves
/// to `Error` with no coordinate.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("device position unavailable: {0}")]
    PermissionDenied(PositionError),

    #[error("no geocoding result for \"{query}\"")]
    NotFound { query: String },

    #[error("geocoding failed: {0}")]
    ResolutionFailed(#[source] ServiceError),
}

impl ResolveError {
    /// Message shown to the user in place of the map.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            ResolveError::PermissionDenied(PositionError::Unsupported) => {
                "Geolocation is not supported on this device."
            }
            ResolveError::PermissionDenied(_) => "Unable to retrieve your location.",
            ResolveError::NotFound { .. } => "Location not found.",
            ResolveError::ResolutionFailed(_) => "Search failed.",
        }
    }
}

/// Failure to compute a route. Never fatal: the session keeps its state and
/// only shows an advisory.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The routing service answered but had no viable route.
    #[error("no route found (code {code})")]
    NoRoute { code: String },
}

impl RoutingError {
    pub const USER_MESSAGE: &'static str = "Could not calculate route.";

    #[must_use]
    pub fn user_message(&self) -> &'static str {
        Self::USER_MESSAGE
    }
}
