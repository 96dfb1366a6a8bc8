//! Single-shot prediction path.
//!
//! On a fresh cache hit the cached probabilities are returned with freshly
//! fetched match metadata. On a miss the orchestrator calls the match
//! provider, feature builder, and outcome model in that order and caches the
//! result. Failures are returned unchanged and never reach the cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use common::{FeatureBuilder, MatchProvider, OutcomeModel, PredictionRecord, Result};
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, PredictionCache};

/// Fan-out, caching, and decision logic for one prediction.
pub struct PredictionOrchestrator {
    matches: Arc<dyn MatchProvider>,
    features: Arc<dyn FeatureBuilder>,
    model: Arc<dyn OutcomeModel>,
    cache: PredictionCache,
    freshness: Duration,
}

impl PredictionOrchestrator {
    pub fn new(
        matches: Arc<dyn MatchProvider>,
        features: Arc<dyn FeatureBuilder>,
        model: Arc<dyn OutcomeModel>,
        cache: PredictionCache,
        freshness: Duration,
    ) -> Self {
        Self {
            matches,
            features,
            model,
            cache,
            freshness,
        }
    }

    /// Serve from cache when fresh, otherwise recompute.
    ///
    /// Match metadata is fetched on every call, cache hit or not.
    pub async fn get_prediction(&self, match_id: &str) -> Result<PredictionRecord> {
        if let Some(entry) = self.cache.fresh_entry(match_id, self.freshness) {
            debug!("{}: cache hit", match_id);
            let match_info = self.matches.get_match(match_id).await?;
            return Ok(PredictionRecord::new(
                match_id,
                match_info,
                entry.probabilities,
                entry.computed_at_utc,
            ));
        }

        debug!("{}: cache miss", match_id);
        self.compute_prediction(match_id).await
    }

    /// Always run the full fan-out and refresh the cache.
    pub async fn compute_prediction(&self, match_id: &str) -> Result<PredictionRecord> {
        // Features are only requested once the match is known to exist.
        let match_info = self.matches.get_match(match_id).await.map_err(|e| {
            debug!("{}: match lookup failed: {}", match_id, e);
            e
        })?;

        let features = self
            .features
            .build_match_features(match_id)
            .await
            .map_err(|e| {
                warn!("{}: feature build failed: {}", match_id, e);
                e
            })?;

        let probs = self.model.predict_outcome(&features).await.map_err(|e| {
            warn!("{}: outcome model failed: {}", match_id, e);
            e
        })?;

        let computed_at = Utc::now();
        self.cache.insert_entry(
            match_id,
            CacheEntry {
                probabilities: probs,
                computed_at: Instant::now(),
                computed_at_utc: computed_at,
            },
        );

        info!(
            "{}: {} vs {} → home={:.3} draw={:.3} away={:.3}",
            match_id,
            match_info.home_team_id,
            match_info.away_team_id,
            probs.home_win_prob,
            probs.draw_prob,
            probs.away_win_prob
        );

        Ok(PredictionRecord::new(match_id, match_info, probs, computed_at))
    }
}
