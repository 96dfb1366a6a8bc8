//! Outcome model crate.
//!
//! Scores `[home_elo, away_elo, elo_diff, is_knockout]` feature vectors into
//! home/draw/away probabilities.

pub mod elo;

use async_trait::async_trait;
use common::config::ModelConfig;
use common::{FeatureVector, OutcomeModel, OutcomeProbabilities, Result};
use tracing::debug;

pub use elo::{normalize, predict_outcome, sigmoid};

/// In-process Elo model behind the `OutcomeModel` contract.
#[derive(Debug, Clone, Default)]
pub struct EloOutcomeModel {
    config: ModelConfig,
}

impl EloOutcomeModel {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl OutcomeModel for EloOutcomeModel {
    async fn predict_outcome(&self, features: &FeatureVector) -> Result<OutcomeProbabilities> {
        let probs = predict_outcome(features.as_slice(), &self.config)?;
        debug!(
            "scored {} features: home={:.3} draw={:.3} away={:.3}",
            features.len(),
            probs.home_win_prob,
            probs.draw_prob,
            probs.away_win_prob
        );
        Ok(probs)
    }
}
