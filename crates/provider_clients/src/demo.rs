//! In-process demo catalog.
//!
//! Holds matches and teams in memory and serves them through the
//! `MatchProvider` and `FeatureBuilder` contracts, so the orchestrator runs
//! without any remote services.

use std::sync::Arc;

use async_trait::async_trait;
use common::{Error, FeatureBuilder, FeatureVector, Match, MatchProvider, Result, Team};
use dashmap::DashMap;
use tracing::debug;

/// Rating assumed for teams that are unknown or unrated.
pub const DEFAULT_ELO: f64 = 1500.0;

/// Thread-safe match and team directory.
#[derive(Debug, Clone, Default)]
pub struct DemoCatalog {
    matches: Arc<DashMap<String, Match>>,
    teams: Arc<DashMap<String, Team>>,
}

impl DemoCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with the 2022 final, ARG vs FRA.
    pub fn seeded() -> Self {
        let catalog = Self::new();
        catalog.add_match(Match {
            id: "1".into(),
            home_team_id: "ARG".into(),
            away_team_id: "FRA".into(),
            stage: "Final".into(),
            kick_off_utc: "2022-12-18T15:00:00Z".into(),
        });
        catalog.add_team(Team {
            id: "ARG".into(),
            name: "Argentina".into(),
            country: "Argentina".into(),
            elo_rating: Some(2100),
        });
        catalog.add_team(Team {
            id: "FRA".into(),
            name: "France".into(),
            country: "France".into(),
            elo_rating: Some(2050),
        });
        catalog
    }

    pub fn add_match(&self, m: Match) {
        self.matches.insert(m.id.clone(), m);
    }

    pub fn add_team(&self, team: Team) {
        self.teams.insert(team.id.clone(), team);
    }

    pub fn get_team(&self, team_id: &str) -> Option<Team> {
        self.teams.get(team_id).map(|t| t.clone())
    }

    fn elo_for(&self, team_id: &str) -> f64 {
        match self.get_team(team_id).and_then(|t| t.elo_rating) {
            Some(rating) if rating != 0 => rating as f64,
            _ => DEFAULT_ELO,
        }
    }
}

#[async_trait]
impl MatchProvider for DemoCatalog {
    async fn get_match(&self, match_id: &str) -> Result<Match> {
        self.matches
            .get(match_id)
            .map(|m| m.clone())
            .ok_or_else(|| Error::NotFound(format!("match {}", match_id)))
    }
}

#[async_trait]
impl FeatureBuilder for DemoCatalog {
    /// `[home_elo, away_elo, elo_diff, is_knockout]`
    async fn build_match_features(&self, match_id: &str) -> Result<FeatureVector> {
        let m = self.get_match(match_id).await?;

        let elo_home = self.elo_for(&m.home_team_id);
        let elo_away = self.elo_for(&m.away_team_id);
        let is_knockout = if m.is_knockout() { 1.0 } else { 0.0 };

        debug!(
            "{}: {} ({:.0}) vs {} ({:.0}), knockout={}",
            match_id, m.home_team_id, elo_home, m.away_team_id, elo_away, is_knockout
        );

        Ok(FeatureVector::new(vec![
            elo_home,
            elo_away,
            elo_home - elo_away,
            is_knockout,
        ]))
    }
}
