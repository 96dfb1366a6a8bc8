//! Collaborator clients for the prediction orchestrator.
//!
//! HTTP/JSON clients for the remote match, feature, and model services, plus
//! an in-process demo catalog that can stand in for the match and feature
//! services.

pub mod demo;
pub mod feature_client;
pub mod http;
pub mod match_client;
pub mod model_client;

#[cfg(test)]
mod test_server;

pub use demo::DemoCatalog;
pub use feature_client::FeatureServiceClient;
pub use match_client::MatchServiceClient;
pub use model_client::ModelServiceClient;
