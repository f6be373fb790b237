//! Shared HTTP plumbing for the service clients.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::ServiceError;

/// Builds the `reqwest` client every service client wraps.
pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ServiceError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parses a base URL so that relative joins append to its path.
///
/// Normalises to exactly one trailing slash: without it, `Url::join` would
/// replace the last path segment instead of appending to it.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ServiceError> {
    let normalised = format!("{}/", raw.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ServiceError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}

/// Parses an endpoint URL verbatim.
pub(crate) fn parse_endpoint_url(raw: &str) -> Result<Url, ServiceError> {
    Url::parse(raw).map_err(|e| ServiceError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })
}

/// Joins a relative path onto a base produced by [`parse_base_url`].
pub(crate) fn join(base: &Url, path: &str) -> Result<Url, ServiceError> {
    base.join(path).map_err(|e| ServiceError::InvalidBaseUrl {
        url: format!("{base}{path}"),
        reason: e.to_string(),
    })
}

/// Asserts a 2xx status and parses the body as `T`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ServiceError::UnexpectedStatus {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ServiceError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}
