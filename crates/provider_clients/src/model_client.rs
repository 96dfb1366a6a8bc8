//! HTTP client for the outcome model service.

use std::time::Duration;

use async_trait::async_trait;
use common::config::Endpoint;
use common::{FeatureVector, OutcomeModel, OutcomeProbabilities, Result};
use reqwest::Url;
use tracing::debug;

use crate::http::{build_client, check_status, endpoint_url, parse_base_url, transport_error};

const SERVICE: &str = "model-service";

/// Async client for `POST /predict`.
#[derive(Debug, Clone)]
pub struct ModelServiceClient {
    client: reqwest::Client,
    predict_url: Url,
}

impl ModelServiceClient {
    pub fn new(endpoint: &Endpoint, timeout: Duration) -> Result<Self> {
        let base = parse_base_url(SERVICE, &endpoint.base_url())?;
        Ok(Self {
            client: build_client(SERVICE, timeout)?,
            predict_url: endpoint_url(SERVICE, &base, &["predict"])?,
        })
    }
}

#[async_trait]
impl OutcomeModel for ModelServiceClient {
    async fn predict_outcome(&self, features: &FeatureVector) -> Result<OutcomeProbabilities> {
        debug!("Scoring {} features: {}", features.len(), self.predict_url);

        let resp = self
            .client
            .post(self.predict_url.clone())
            .json(features)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;
        let resp = check_status(SERVICE, "predict", resp).await?;

        resp.json::<OutcomeProbabilities>()
            .await
            .map_err(|e| transport_error(SERVICE, e))
    }
}
