//! Shared types, config, and error definitions for the prediction orchestrator.

pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use config::OrchestratorConfig;
pub use error::Error;
pub use provider::{FeatureBuilder, MatchProvider, OutcomeModel};
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
