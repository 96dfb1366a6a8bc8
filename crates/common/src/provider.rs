//! Collaborator contracts consumed by the orchestrator.
//!
//! Implementations must be safe to share across tasks; the orchestrator holds
//! them as `Arc<dyn ...>` and calls them concurrently without extra locking.

use async_trait::async_trait;

use crate::{FeatureVector, Match, OutcomeProbabilities, Result};

/// Resolves a match id to its metadata.
#[async_trait]
pub trait MatchProvider: Send + Sync {
    /// Returns `Error::NotFound` for unknown ids.
    async fn get_match(&self, match_id: &str) -> Result<Match>;
}

/// Builds the model input for a match.
#[async_trait]
pub trait FeatureBuilder: Send + Sync {
    async fn build_match_features(&self, match_id: &str) -> Result<FeatureVector>;
}

/// Scores a feature vector into outcome probabilities.
#[async_trait]
pub trait OutcomeModel: Send + Sync {
    /// Returns `Error::InvalidInput` when the vector is too short.
    async fn predict_outcome(&self, features: &FeatureVector) -> Result<OutcomeProbabilities>;
}
