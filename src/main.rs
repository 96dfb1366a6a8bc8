//! Prediction orchestrator: serves World Cup match outcome predictions.
//!
//! Single-binary Tokio application that:
//! 1. Loads configuration (.env, config.toml, environment)
//! 2. Wires the match, feature, and model collaborators
//! 3. Serves `get_prediction` and `stream_prediction` over TCP

mod config;
mod server;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use common::config::{BackendMode, OrchestratorConfig};
use common::{FeatureBuilder, MatchProvider, OutcomeModel, Result};
use orchestrator::{PredictionCache, PredictionOrchestrator, StreamPublisher};
use outcome_model::EloOutcomeModel;
use provider_clients::{DemoCatalog, FeatureServiceClient, MatchServiceClient, ModelServiceClient};

use crate::server::PredictionServer;

/// Match outcome prediction orchestrator
#[derive(Parser)]
#[command(name = "prediction-orchestrator", about = "Match outcome prediction service")]
struct Cli {
    /// Serve from the built-in demo catalog and local model instead of remote services.
    #[arg(long)]
    demo: bool,

    /// Path to a TOML config file (default: ./config.toml when present).
    #[arg(long, env = "PREDICTION_CONFIG")]
    config: Option<PathBuf>,
}

struct Collaborators {
    matches: Arc<dyn MatchProvider>,
    features: Arc<dyn FeatureBuilder>,
    model: Arc<dyn OutcomeModel>,
}

fn build_collaborators(cfg: &OrchestratorConfig) -> Result<Collaborators> {
    let collab = &cfg.collaborators;
    let local_model = || Arc::new(EloOutcomeModel::new(cfg.model.clone()));

    match collab.mode {
        BackendMode::Demo => {
            let catalog = Arc::new(DemoCatalog::seeded());
            Ok(Collaborators {
                matches: catalog.clone(),
                features: catalog,
                model: local_model(),
            })
        }
        BackendMode::Remote => {
            let timeout = Duration::from_secs(collab.request_timeout_secs);
            let matches = Arc::new(MatchServiceClient::new(&collab.match_service, timeout)?);
            let features = Arc::new(FeatureServiceClient::new(&collab.feature_service, timeout)?);
            let model: Arc<dyn OutcomeModel> = if collab.use_local_model {
                local_model()
            } else {
                Arc::new(ModelServiceClient::new(&collab.model_service, timeout)?)
            };
            Ok(Collaborators {
                matches,
                features,
                model,
            })
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "prediction_orchestrator=info,orchestrator=info,provider_clients=info,outcome_model=info"
                    .into()
            }),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    info!("Prediction orchestrator starting up...");

    let mut cfg = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if cli.demo {
        cfg.collaborators.mode = BackendMode::Demo;
    }

    match cfg.collaborators.mode {
        BackendMode::Demo => info!("Backend: DEMO (built-in catalog, local model)"),
        BackendMode::Remote => info!(
            "Backend: match={} features={} model={}",
            cfg.collaborators.match_service.base_url(),
            cfg.collaborators.feature_service.base_url(),
            if cfg.collaborators.use_local_model {
                "local".to_string()
            } else {
                cfg.collaborators.model_service.base_url()
            },
        ),
    }
    info!(
        "Policy: freshness={}s, stream_interval={}s, max_workers={}, cache_max_entries={}",
        cfg.cache.ttl_secs, cfg.stream.interval_secs, cfg.server.max_workers, cfg.cache.max_entries,
    );

    let collaborators = match build_collaborators(&cfg) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to build collaborators: {}", e);
            std::process::exit(1);
        }
    };

    let orchestrator = Arc::new(PredictionOrchestrator::new(
        collaborators.matches,
        collaborators.features,
        collaborators.model,
        PredictionCache::with_max_entries(cfg.cache.max_entries),
        cfg.cache.ttl(),
    ));
    let publisher = StreamPublisher::new(
        orchestrator.clone(),
        cfg.stream.interval(),
        cfg.stream.buffer,
    );

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    info!("PredictionService listening on {}", addr);

    let shutdown = CancellationToken::new();
    let server = PredictionServer::new(orchestrator, publisher, cfg.server.max_workers);
    let mut server_handle = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { server.run(listener, shutdown).await }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        r = &mut server_handle => {
            error!("Server task exited: {:?}", r);
        }
    }

    shutdown.cancel();
    if !server_handle.is_finished() {
        let _ = tokio::time::timeout(Duration::from_secs(5), server_handle).await;
    }
    info!("Prediction orchestrator stopped");
}
