//! Domain types shared across the orchestrator and its collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of leading features the outcome model reads.
pub const MIN_FEATURES: usize = 4;

// ── Match metadata ────────────────────────────────────────────────────

/// A tournament match as served by the match provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    #[serde(default)]
    pub home_team_id: String,
    #[serde(default)]
    pub away_team_id: String,
    #[serde(default)]
    pub stage: String,
    /// Kickoff time as RFC 3339, e.g. "2022-12-18T15:00:00Z".
    #[serde(default)]
    pub kick_off_utc: String,
}

impl Match {
    /// Anything other than a group-stage fixture counts as knockout.
    pub fn is_knockout(&self) -> bool {
        let stage = self.stage.trim().to_ascii_lowercase();
        stage != "group" && stage != "groups"
    }
}

/// A team as known to the team directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub elo_rating: Option<i32>,
}

// ── Model input / output ──────────────────────────────────────────────

/// Ordered model input: `[home_elo, away_elo, elo_diff, is_knockout, ...]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub features: Vec<f64>,
}

impl FeatureVector {
    pub fn new(features: Vec<f64>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.features
    }
}


/// Home / draw / away probabilities. Components lie in [0,1] and sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub home_win_prob: f64,
    pub draw_prob: f64,
    pub away_win_prob: f64,
}

impl OutcomeProbabilities {
    pub fn new(home_win_prob: f64, draw_prob: f64, away_win_prob: f64) -> Self {
        Self {
            home_win_prob,
            draw_prob,
            away_win_prob,
        }
    }

    pub fn uniform() -> Self {
        let third = 1.0 / 3.0;
        Self::new(third, third, third)
    }

    pub fn total(&self) -> f64 {
        self.home_win_prob + self.draw_prob + self.away_win_prob
    }
}

// ── Orchestrator output ───────────────────────────────────────────────

/// One prediction as returned by `GetPrediction` and emitted by streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub match_id: String,
    #[serde(rename = "match")]
    pub match_info: Match,
    pub home_win_prob: f64,
    pub draw_prob: f64,
    pub away_win_prob: f64,
    /// When the probabilities were produced (the cache stamp on a hit).
    pub computed_at: DateTime<Utc>,
}

impl PredictionRecord {
    pub fn new(
        match_id: &str,
        match_info: Match,
        probs: OutcomeProbabilities,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            match_id: match_id.to_string(),
            match_info,
            home_win_prob: probs.home_win_prob,
            draw_prob: probs.draw_prob,
            away_win_prob: probs.away_win_prob,
            computed_at,
        }
    }

    pub fn probabilities(&self) -> OutcomeProbabilities {
        OutcomeProbabilities::new(self.home_win_prob, self.draw_prob, self.away_win_prob)
    }
}
