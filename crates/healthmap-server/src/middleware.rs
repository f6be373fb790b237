use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::ApiError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied request id echoed back; anything longer is replaced.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Client count at which expired windows are swept on the next admission.
const SWEEP_THRESHOLD: usize = 4096;

/// Request id for the current request, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter keyed by client, shared by the nearby routes.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    clients: Arc<Mutex<HashMap<String, ClientWindow>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts one request for `client`, returning `false` once the client has
    /// used up its window.
    async fn admit(&self, client: &str, now: Instant) -> bool {
        let mut clients = self.clients.lock().await;

        if clients.len() >= SWEEP_THRESHOLD {
            let window = self.window;
            clients.retain(|_, w| now.saturating_duration_since(w.started_at) < window);
        }

        let entry = clients.entry(client.to_owned()).or_insert(ClientWindow {
            started_at: now,
            count: 0,
        });
        if now.saturating_duration_since(entry.started_at) >= self.window {
            *entry = ClientWindow {
                started_at: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }
}

/// Client key for rate limiting: the first `x-forwarded-for` hop, else the
/// peer address when the server was started with connect info.
fn client_key(req: &Request) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').map(str::trim).find(|hop| !hop.is_empty()));
    if let Some(hop) = forwarded {
        return hop.to_owned();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_owned(), |ConnectInfo(addr)| addr.ip().to_string())
}

fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    let id = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    (!id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN).then(|| id.to_owned())
}

/// Extracts or generates the request id.
///
/// A usable incoming `x-request-id` is kept, otherwise a `UUIDv4` is minted.
/// The id is stored as a [`RequestId`] extension, echoed on the response and
/// attached to a `request` span around the rest of the stack.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = incoming_request_id(req.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));
    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %req.method(),
        path = req.uri().path(),
    );

    let mut res = next.run(req).instrument(span).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }

    res
}

/// Rejects a client's requests beyond the per-window limit with a 429
/// `rate_limited` error envelope.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let client = client_key(&req);
    if rate_limit.admit(&client, Instant::now()).await {
        return next.run(req).await;
    }

    tracing::warn!(
        client = %client,
        path = req.uri().path(),
        limit = rate_limit.max_requests,
        "rate limit exceeded"
    );
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    ApiError::new(request_id, "rate_limited", "rate limit exceeded").into_response()
}
