//! Shared HTTP plumbing: client construction and status → error mapping.

use std::time::Duration;

use common::{Error, Result};
use reqwest::Url;
use tracing::warn;

/// Build a pooled client for one collaborator.
pub fn build_client(service: &str, timeout: Duration) -> Result<reqwest::Client> {
    // Collaborators are addressed directly, never through an env proxy.
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(4)
        .tcp_keepalive(Duration::from_secs(30))
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Config(format!("failed to build {} HTTP client: {}", service, e)))
}

/// Parse a collaborator base URL once, at client construction.
pub fn parse_base_url(service: &str, base: &str) -> Result<Url> {
    Url::parse(base)
        .map_err(|e| Error::Config(format!("invalid {} base URL {}: {}", service, base, e)))
}

/// `{base}/{collection}/{id}` with the id percent-encoded as one path segment.
///
/// Ids that would collapse into a different path (empty, `.` or `..`) are
/// reported as `NotFound` without a request.
pub fn resource_url(service: &str, base: &Url, collection: &str, id: &str) -> Result<Url> {
    if matches!(id, "" | "." | "..") {
        return Err(Error::NotFound(format!("{} {:?}", collection, id)));
    }
    endpoint_url(service, base, &[collection, id])
}

/// `base` with `segments` appended, each percent-encoded.
pub fn endpoint_url(service: &str, base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::Config(format!("{} base URL cannot take a path: {}", service, base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Map a transport failure (connect, timeout, body read) to `Unavailable`.
pub fn transport_error(service: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::unavailable(service, format!("request timed out: {}", err))
    } else {
        Error::unavailable(service, err.to_string())
    }
}

/// Map a non-2xx status to the error taxonomy.
///
/// 404 → `NotFound`, 400/422 → `InvalidInput`, anything else → `Unavailable`.
pub fn status_error(service: &str, status: u16, subject: &str, body: &str) -> Error {
    let body: String = body.chars().take(500).collect();
    let body = body.trim();
    match status {
        404 => Error::NotFound(format!("{}: {}", subject, body)),
        400 | 422 => Error::InvalidInput(format!("{}: {}", subject, body)),
        _ => {
            warn!("{} returned {} for {}: {}", service, status, subject, body);
            Error::unavailable(service, format!("HTTP {} for {}", status, subject))
        }
    }
}

/// Pass 2xx responses through; convert everything else with `status_error`.
pub async fn check_status(
    service: &str,
    subject: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = resp.status().as_u16();
    if (200..300).contains(&status) {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(status_error(service, status, subject, &body))
}
