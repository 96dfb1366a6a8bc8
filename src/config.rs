//! Configuration loader: merges env vars, .env file, and config.toml.

use std::path::Path;

use common::config::{BackendMode, OrchestratorConfig};
use common::Error;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn parse_port(raw: &str, env_name: &str) -> Result<u16, Error> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| Error::Config(format!("{env_name} must be a port number (0-65535)")))
}

fn parse_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer >= 0")))
}

fn parse_usize(raw: &str, env_name: &str) -> Result<usize, Error> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer >= 0")))
}

fn parse_bool(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    lowered != "0" && lowered != "false" && lowered != "no" && lowered != "off"
}

/// Blank values count as unset.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn validate_config(config: &OrchestratorConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.server.host.trim().is_empty() {
        issues.push("server.host must not be empty".into());
    }
    if config.server.max_workers == 0 {
        issues.push("server.max_workers must be > 0".into());
    }

    if config.collaborators.mode == BackendMode::Remote {
        for (name, endpoint) in [
            ("match_service", &config.collaborators.match_service),
            ("feature_service", &config.collaborators.feature_service),
            ("model_service", &config.collaborators.model_service),
        ] {
            if endpoint.host.trim().is_empty() {
                issues.push(format!("collaborators.{name}.host must not be empty"));
            }
            if endpoint.port == 0 {
                issues.push(format!("collaborators.{name}.port must be > 0"));
            }
        }
    }
    if config.collaborators.request_timeout_secs == 0 {
        issues.push("collaborators.request_timeout_secs must be > 0".into());
    }

    if config.cache.ttl_secs == 0 {
        issues.push("cache.ttl_secs must be > 0".into());
    }

    if config.stream.interval_secs == 0 {
        issues.push("stream.interval_secs must be > 0".into());
    }
    if config.stream.buffer == 0 {
        issues.push("stream.buffer must be > 0".into());
    }

    let model = &config.model;
    for (name, value) in [
        ("elo_scale", model.elo_scale),
        ("knockout_multiplier", model.knockout_multiplier),
        ("draw_floor", model.draw_floor),
        ("draw_ceiling", model.draw_ceiling),
        ("draw_decay_per_elo", model.draw_decay_per_elo),
    ] {
        if !value.is_finite() {
            issues.push(format!("model.{name} must be a finite number"));
        }
    }
    if model.elo_scale <= 0.0 {
        issues.push("model.elo_scale must be > 0".into());
    }
    if model.knockout_multiplier <= 0.0 {
        issues.push("model.knockout_multiplier must be > 0".into());
    }
    if !(0.0..=1.0).contains(&model.draw_floor) || !(0.0..=1.0).contains(&model.draw_ceiling) {
        issues.push("model.draw_floor and model.draw_ceiling must be in [0,1]".into());
    }
    if model.draw_floor > model.draw_ceiling {
        issues.push("model.draw_floor must be <= model.draw_ceiling".into());
    }
    if model.draw_decay_per_elo < 0.0 {
        issues.push("model.draw_decay_per_elo must be >= 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut OrchestratorConfig, lookup: F) -> Result<(), Error>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| non_blank(lookup(name));
    let collab = &mut config.collaborators;

    if let Some(host) = get("MATCH_SERVICE_HOST") {
        collab.match_service.host = host;
    }
    if let Some(port) = get("MATCH_SERVICE_PORT") {
        collab.match_service.port = parse_port(&port, "MATCH_SERVICE_PORT")?;
    }
    if let Some(host) = get("FEATURE_SERVICE_HOST") {
        collab.feature_service.host = host;
    }
    if let Some(port) = get("FEATURE_SERVICE_PORT") {
        collab.feature_service.port = parse_port(&port, "FEATURE_SERVICE_PORT")?;
    }
    if let Some(host) = get("MODEL_SERVICE_HOST") {
        collab.model_service.host = host;
    }
    if let Some(port) = get("MODEL_SERVICE_PORT") {
        collab.model_service.port = parse_port(&port, "MODEL_SERVICE_PORT")?;
    }
    if let Some(raw) = get("PREDICTION_LOCAL_MODEL") {
        collab.use_local_model = parse_bool(&raw);
    }
    if let Some(mode) = get("PREDICTION_BACKEND") {
        collab.mode = match mode.trim().to_ascii_lowercase().as_str() {
            "remote" => BackendMode::Remote,
            "demo" => BackendMode::Demo,
            _ => {
                return Err(Error::Config(
                    "PREDICTION_BACKEND must be one of: remote, demo".into(),
                ));
            }
        };
    }

    if let Some(host) = get("PREDICTION_SERVICE_HOST") {
        config.server.host = host;
    }
    if let Some(port) = get("PREDICTION_SERVICE_PORT") {
        config.server.port = parse_port(&port, "PREDICTION_SERVICE_PORT")?;
    }
    if let Some(raw) = get("PREDICTION_MAX_WORKERS") {
        config.server.max_workers = parse_usize(&raw, "PREDICTION_MAX_WORKERS")?;
    }
    if let Some(raw) = get("PREDICTION_CACHE_TTL_SECS") {
        config.cache.ttl_secs = parse_u64(&raw, "PREDICTION_CACHE_TTL_SECS")?;
    }
    if let Some(raw) = get("PREDICTION_CACHE_MAX_ENTRIES") {
        config.cache.max_entries = parse_usize(&raw, "PREDICTION_CACHE_MAX_ENTRIES")?;
    }
    if let Some(raw) = get("PREDICTION_STREAM_INTERVAL_SECS") {
        config.stream.interval_secs = parse_u64(&raw, "PREDICTION_STREAM_INTERVAL_SECS")?;
    }

    Ok(())
}

/// Load orchestrator configuration from environment and optional config file.
pub fn load_config(path: Option<&Path>) -> Result<OrchestratorConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = OrchestratorConfig::default();

    // 3. Config file: an explicit path must exist, the default one is optional.
    let config_path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    if path.is_some() || config_path.exists() {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", config_path.display(), e))
        })?;
        config = toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", config_path.display(), e))
        })?;
    }

    // 4. Override with environment variables (highest priority).
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    validate_config(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        validate_config(&OrchestratorConfig::default()).unwrap();
    }

    #[test]
    fn test_env_overrides_endpoints_and_policy() {
        let vars = env(&[
            ("MATCH_SERVICE_HOST", "match.internal"),
            ("MATCH_SERVICE_PORT", "6001"),
            ("MODEL_SERVICE_PORT", "6005"),
            ("PREDICTION_SERVICE_PORT", "7000"),
            ("PREDICTION_CACHE_TTL_SECS", "30"),
            ("PREDICTION_STREAM_INTERVAL_SECS", "2"),
            ("PREDICTION_BACKEND", "demo"),
            ("PREDICTION_LOCAL_MODEL", "yes"),
            ("FEATURE_SERVICE_HOST", "   "),
        ]);
        let mut cfg = OrchestratorConfig::default();
        apply_env_overrides(&mut cfg, |k| vars.get(k).cloned()).unwrap();

        assert_eq!(cfg.collaborators.match_service.host, "match.internal");
        assert_eq!(cfg.collaborators.match_service.port, 6001);
        assert_eq!(cfg.collaborators.model_service.port, 6005);
        // Blank value leaves the default in place.
        assert_eq!(cfg.collaborators.feature_service.host, "localhost");
        assert_eq!(cfg.server.port, 7000);
        assert_eq!(cfg.cache.ttl_secs, 30);
        assert_eq!(cfg.stream.interval_secs, 2);
        assert_eq!(cfg.collaborators.mode, BackendMode::Demo);
        assert!(cfg.collaborators.use_local_model);
    }

    #[test]
    fn test_bad_port_rejected() {
        let vars = env(&[("MATCH_SERVICE_PORT", "not-a-port")]);
        let mut cfg = OrchestratorConfig::default();
        let err = apply_env_overrides(&mut cfg, |k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("MATCH_SERVICE_PORT"), "err={}", err);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let vars = env(&[("PREDICTION_BACKEND", "carrier-pigeon")]);
        let mut cfg = OrchestratorConfig::default();
        assert!(apply_env_overrides(&mut cfg, |k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn test_validation_collects_issues() {
        let mut cfg = OrchestratorConfig::default();
        cfg.cache.ttl_secs = 0;
        cfg.stream.interval_secs = 0;
        cfg.server.max_workers = 0;
        cfg.model.draw_floor = 0.5;

        let msg = validate_config(&cfg).unwrap_err().to_string();
        assert!(msg.contains("cache.ttl_secs"));
        assert!(msg.contains("stream.interval_secs"));
        assert!(msg.contains("server.max_workers"));
        assert!(msg.contains("draw_floor must be <= model.draw_ceiling"));
    }

    #[test]
    fn test_non_finite_model_params_rejected() {
        let mut cfg = OrchestratorConfig::default();
        cfg.model.elo_scale = f64::NAN;
        cfg.model.knockout_multiplier = f64::NAN;
        cfg.model.draw_decay_per_elo = f64::INFINITY;

        let msg = validate_config(&cfg).unwrap_err().to_string();
        assert!(msg.contains("model.elo_scale must be a finite number"), "msg={}", msg);
        assert!(msg.contains("model.knockout_multiplier must be a finite number"));
        assert!(msg.contains("model.draw_decay_per_elo must be a finite number"));
    }

    #[test]
    fn test_demo_mode_skips_endpoint_checks() {
        let mut cfg = OrchestratorConfig::default();
        cfg.collaborators.mode = BackendMode::Demo;
        cfg.collaborators.match_service.host = String::new();
        validate_config(&cfg).unwrap();

        cfg.collaborators.mode = BackendMode::Remote;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_toml_sections_parse() {
        let raw = r#"
            [server]
            port = 6060

            [collaborators]
            mode = "remote"
            use_local_model = true

            [collaborators.match_service]
            host = "matches"
            port = 9001

            [cache]
            ttl_secs = 15
            max_entries = 500
        "#;
        let cfg: OrchestratorConfig = toml::from_str(raw).unwrap();
        assert_eq!(cfg.server.port, 6060);
        assert_eq!(cfg.server.max_workers, 10);
        assert_eq!(cfg.collaborators.match_service.host, "matches");
        assert!(cfg.collaborators.use_local_model);
        assert_eq!(cfg.cache.max_entries, 500);
        assert_eq!(cfg.stream.interval_secs, 5);
        validate_config(&cfg).unwrap();
    }
}
