//! Prediction orchestrator crate.
//!
//! Fans out to the match, feature, and model collaborators, caches recent
//! results, and drives streaming subscriptions.

pub mod cache;
pub mod engine;
pub mod stream;

#[cfg(test)]
mod testing;

pub use cache::{CacheEntry, PredictionCache};
pub use engine::PredictionOrchestrator;
pub use stream::{PredictionStream, StreamPublisher};
