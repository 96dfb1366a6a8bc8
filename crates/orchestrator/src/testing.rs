//! Counting fakes of the collaborator traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use common::{
    Error, FeatureBuilder, FeatureVector, Match, MatchProvider, OutcomeModel,
    OutcomeProbabilities, Result,
};

use crate::{PredictionCache, PredictionOrchestrator};

pub fn make_match(id: &str, stage: &str) -> Match {
    Match {
        id: id.into(),
        home_team_id: "ARG".into(),
        away_team_id: "FRA".into(),
        stage: stage.into(),
        kick_off_utc: "2022-12-18T15:00:00Z".into(),
    }
}

#[derive(Default)]
pub struct FakeMatches {
    matches: Mutex<HashMap<String, Match>>,
    pub calls: AtomicUsize,
}

impl FakeMatches {
    pub fn with(ids: &[&str]) -> Self {
        let fake = Self::default();
        for id in ids {
            fake.insert(make_match(id, "Final"));
        }
        fake
    }

    pub fn insert(&self, m: Match) {
        self.matches.lock().unwrap().insert(m.id.clone(), m);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchProvider for FakeMatches {
    async fn get_match(&self, match_id: &str) -> Result<Match> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.matches
            .lock()
            .unwrap()
            .get(match_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("match {}", match_id)))
    }
}

#[derive(Default)]
pub struct FakeFeatures {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeFeatures {
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeatureBuilder for FakeFeatures {
    async fn build_match_features(&self, _match_id: &str) -> Result<FeatureVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::unavailable("feature-service", "connection refused"));
        }
        Ok(FeatureVector::new(vec![2100.0, 2050.0, 50.0, 1.0]))
    }
}

pub struct FakeModel {
    output: Mutex<Result<OutcomeProbabilities>>,
    pub calls: AtomicUsize,
}

impl FakeModel {
    pub fn returning(probs: OutcomeProbabilities) -> Self {
        Self {
            output: Mutex::new(Ok(probs)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            output: Mutex::new(Err(Error::InvalidInput(
                "expected at least 4 features".into(),
            ))),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_output(&self, probs: OutcomeProbabilities) {
        *self.output.lock().unwrap() = Ok(probs);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OutcomeModel for FakeModel {
    async fn predict_outcome(&self, _features: &FeatureVector) -> Result<OutcomeProbabilities> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.output.lock().unwrap() {
            Ok(p) => Ok(*p),
            Err(e) => Err(Error::InvalidInput(e.to_string())),
        }
    }
}

/// Fakes wired into an orchestrator, with handles kept for inspection.
pub struct Harness {
    pub matches: Arc<FakeMatches>,
    pub features: Arc<FakeFeatures>,
    pub model: Arc<FakeModel>,
    pub cache: PredictionCache,
    pub orchestrator: Arc<PredictionOrchestrator>,
}

impl Harness {
    pub fn new(matches: FakeMatches, features: FakeFeatures, model: FakeModel) -> Self {
        Self::with_freshness(matches, features, model, Duration::from_secs(10))
    }

    pub fn with_freshness(
        matches: FakeMatches,
        features: FakeFeatures,
        model: FakeModel,
        freshness: Duration,
    ) -> Self {
        let matches = Arc::new(matches);
        let features = Arc::new(features);
        let model = Arc::new(model);
        let cache = PredictionCache::new();
        let orchestrator = Arc::new(PredictionOrchestrator::new(
            matches.clone(),
            features.clone(),
            model.clone(),
            cache.clone(),
            freshness,
        ));
        Self {
            matches,
            features,
            model,
            cache,
            orchestrator,
        }
    }

    pub fn standard() -> Self {
        Self::new(
            FakeMatches::with(&["1"]),
            FakeFeatures::default(),
            FakeModel::returning(OutcomeProbabilities::new(0.5, 0.2, 0.3)),
        )
    }
}
