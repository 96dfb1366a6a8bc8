//! HTTP client for the match service.

use std::time::Duration;

use async_trait::async_trait;
use common::config::Endpoint;
use common::{Match, MatchProvider, Result};
use reqwest::Url;
use tracing::debug;

use crate::http::{build_client, check_status, parse_base_url, resource_url, transport_error};

const SERVICE: &str = "match-service";

/// Async client for `GET /matches/{id}`.
#[derive(Debug, Clone)]
pub struct MatchServiceClient {
    client: reqwest::Client,
    base_url: Url,
}

impl MatchServiceClient {
    pub fn new(endpoint: &Endpoint, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(SERVICE, timeout)?,
            base_url: parse_base_url(SERVICE, &endpoint.base_url())?,
        })
    }
}

#[async_trait]
impl MatchProvider for MatchServiceClient {
    async fn get_match(&self, match_id: &str) -> Result<Match> {
        let url = resource_url(SERVICE, &self.base_url, "matches", match_id)?;
        debug!("Fetching match: {}", url);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;
        let resp = check_status(SERVICE, &format!("match {}", match_id), resp).await?;

        resp.json::<Match>()
            .await
            .map_err(|e| transport_error(SERVICE, e))
    }
}
