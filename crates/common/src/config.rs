//! Orchestrator configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Listener and worker pool.
    #[serde(default)]
    pub server: ServerConfig,

    /// Where the match, feature, and model services live.
    #[serde(default)]
    pub collaborators: CollaboratorConfig,

    /// Prediction cache policy.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Streaming subscription timing.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Parameters for the in-process Elo outcome model.
    #[serde(default)]
    pub model: ModelConfig,
}

/// Listener settings for the orchestrator itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_prediction_port")]
    pub port: u16,

    /// Max connections served at once. Streams hold a slot while open.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

/// How collaborator calls are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// HTTP/JSON services at the configured endpoints.
    Remote,
    /// In-process demo catalog plus the local Elo model.
    Demo,
}

/// A host/port pair for one remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Collaborator endpoints and client behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorConfig {
    #[serde(default = "default_backend")]
    pub mode: BackendMode,

    #[serde(default = "default_match_endpoint")]
    pub match_service: Endpoint,

    #[serde(default = "default_feature_endpoint")]
    pub feature_service: Endpoint,

    #[serde(default = "default_model_endpoint")]
    pub model_service: Endpoint,

    /// Score in-process instead of calling the model service (remote mode only).
    #[serde(default)]
    pub use_local_model: bool,

    /// Per-request timeout for collaborator HTTP calls.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Cache freshness and sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Max age of a cached prediction still served without recomputing.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// Upper bound on cached match ids. 0 keeps every entry.
    #[serde(default)]
    pub max_entries: usize,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Streaming subscription timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Wait between recomputations.
    #[serde(default = "default_stream_interval")]
    pub interval_secs: u64,

    /// Records queued per subscriber before the loop waits on the consumer.
    #[serde(default = "default_stream_buffer")]
    pub buffer: usize,
}

impl StreamConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Elo outcome model parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Elo points per unit of logit.
    #[serde(default = "default_elo_scale")]
    pub elo_scale: f64,

    /// Logit multiplier applied to knockout fixtures.
    #[serde(default = "default_knockout_multiplier")]
    pub knockout_multiplier: f64,

    /// Draw probability for evenly matched sides.
    #[serde(default = "default_draw_ceiling")]
    pub draw_ceiling: f64,

    /// Lowest draw probability however lopsided the match.
    #[serde(default = "default_draw_floor")]
    pub draw_floor: f64,

    /// Draw probability lost per Elo point of rating gap.
    #[serde(default = "default_draw_decay")]
    pub draw_decay_per_elo: f64,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_server_host() -> String {
    "0.0.0.0".into()
}
fn default_prediction_port() -> u16 {
    50056
}
fn default_max_workers() -> usize {
    10
}

fn default_backend() -> BackendMode {
    BackendMode::Remote
}
fn default_match_endpoint() -> Endpoint {
    Endpoint::new("localhost", 50051)
}
fn default_feature_endpoint() -> Endpoint {
    Endpoint::new("localhost", 50054)
}
fn default_model_endpoint() -> Endpoint {
    Endpoint::new("localhost", 50055)
}
fn default_request_timeout() -> u64 {
    10
}

fn default_cache_ttl() -> u64 {
    10
}

fn default_stream_interval() -> u64 {
    5
}
fn default_stream_buffer() -> usize {
    16
}

fn default_elo_scale() -> f64 {
    300.0
}
fn default_knockout_multiplier() -> f64 {
    1.2
}
fn default_draw_ceiling() -> f64 {
    0.35
}
fn default_draw_floor() -> f64 {
    0.15
}
fn default_draw_decay() -> f64 {
    0.001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_prediction_port(),
            max_workers: default_max_workers(),
        }
    }
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            mode: default_backend(),
            match_service: default_match_endpoint(),
            feature_service: default_feature_endpoint(),
            model_service: default_model_endpoint(),
            use_local_model: false,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            max_entries: 0,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_stream_interval(),
            buffer: default_stream_buffer(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            elo_scale: default_elo_scale(),
            knockout_multiplier: default_knockout_multiplier(),
            draw_ceiling: default_draw_ceiling(),
            draw_floor: default_draw_floor(),
            draw_decay_per_elo: default_draw_decay(),
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            collaborators: CollaboratorConfig::default(),
            cache: CacheConfig::default(),
            stream: StreamConfig::default(),
            model: ModelConfig::default(),
        }
    }
}
