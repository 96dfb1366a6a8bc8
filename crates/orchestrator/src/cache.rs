//! In-memory prediction cache.
//!
//! Keyed by match id. Uses `DashMap` so reads and writes for one id are
//! mutually exclusive without a single global lock. Entries are never
//! deleted on expiry; staleness is judged at read time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use common::OutcomeProbabilities;
use dashmap::DashMap;
use tracing::debug;

/// A cached prediction with staleness tracking.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub probabilities: OutcomeProbabilities,
    pub computed_at: Instant,
    /// Wall-clock stamp matching `computed_at`, for reporting.
    pub computed_at_utc: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        self.computed_at.elapsed() < max_age
    }
}

/// Thread-safe prediction cache. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct PredictionCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl PredictionCache {
    /// Unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `max_entries` match ids (0 = unbounded).
    ///
    /// Inserting a new id at capacity evicts the oldest entry.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            max_entries,
        }
    }

    /// Probabilities for `match_id` if computed less than `max_age` ago.
    ///
    /// Missing and stale entries are both reported as `None`.
    pub fn get_if_fresh(&self, match_id: &str, max_age: Duration) -> Option<OutcomeProbabilities> {
        self.fresh_entry(match_id, max_age).map(|e| e.probabilities)
    }

    /// Like `get_if_fresh`, but returns the whole entry.
    pub fn fresh_entry(&self, match_id: &str, max_age: Duration) -> Option<CacheEntry> {
        let entry = self.entries.get(match_id)?;
        if entry.is_fresh(max_age) {
            Some(entry.clone())
        } else {
            debug!("{}: cached prediction stale", match_id);
            None
        }
    }

    /// Overwrite whatever is cached for `match_id`.
    pub fn set(&self, match_id: &str, probabilities: OutcomeProbabilities, computed_at: Instant) {
        let age = chrono::Duration::from_std(computed_at.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.insert_entry(
            match_id,
            CacheEntry {
                probabilities,
                computed_at,
                computed_at_utc: Utc::now() - age,
            },
        );
    }

    /// `set` with a caller-supplied wall-clock stamp.
    ///
    /// The bound is enforced after the insert, so racing writers of new ids
    /// each trim back down and the cache settles at or below `max_entries`.
    pub fn insert_entry(&self, match_id: &str, entry: CacheEntry) {
        self.entries.insert(match_id.to_string(), entry);
        if self.max_entries == 0 {
            return;
        }
        while self.entries.len() > self.max_entries {
            if !self.evict_oldest(match_id) {
                break;
            }
        }
    }

    pub fn contains(&self, match_id: &str) -> bool {
        self.entries.contains_key(match_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove the oldest entry other than `keep`. Returns false when there
    /// is nothing left to evict.
    fn evict_oldest(&self, keep: &str) -> bool {
        // Collect the key first; removing while iterating would deadlock the shard.
        let oldest = self
            .entries
            .iter()
            .filter(|e| e.key().as_str() != keep)
            .min_by_key(|e| e.value().computed_at)
            .map(|e| e.key().clone());

        match oldest {
            Some(key) => {
                debug!("evicting cached prediction for {}", key);
                self.entries.remove(&key);
                true
            }
            None => false,
        }
    }
}
