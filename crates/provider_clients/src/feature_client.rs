//! HTTP client for the feature service.

use std::time::Duration;

use async_trait::async_trait;
use common::config::Endpoint;
use common::{FeatureBuilder, FeatureVector, Result};
use reqwest::Url;
use tracing::debug;

use crate::http::{build_client, check_status, parse_base_url, resource_url, transport_error};

const SERVICE: &str = "feature-service";

/// Async client for `GET /features/{id}`.
#[derive(Debug, Clone)]
pub struct FeatureServiceClient {
    client: reqwest::Client,
    base_url: Url,
}

impl FeatureServiceClient {
    pub fn new(endpoint: &Endpoint, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(SERVICE, timeout)?,
            base_url: parse_base_url(SERVICE, &endpoint.base_url())?,
        })
    }
}

#[async_trait]
impl FeatureBuilder for FeatureServiceClient {
    async fn build_match_features(&self, match_id: &str) -> Result<FeatureVector> {
        let url = resource_url(SERVICE, &self.base_url, "features", match_id)?;
        debug!("Fetching features: {}", url);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;
        let resp = check_status(SERVICE, &format!("features {}", match_id), resp).await?;

        let features: FeatureVector = resp
            .json()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        debug!("Got {} features for match {}", features.len(), match_id);
        Ok(features)
    }
}
