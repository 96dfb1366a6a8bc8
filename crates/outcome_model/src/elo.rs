//! Elo-difference outcome scoring.
//!
//! The rating gap drives a logistic home edge, stretched for knockout
//! fixtures. Draw probability peaks for evenly matched sides and decays
//! linearly with the gap down to a floor. Whatever is left is split between
//! home and away by the home edge.

use common::config::ModelConfig;
use common::{Error, OutcomeProbabilities, Result, MIN_FEATURES};

// ── Main API ──────────────────────────────────────────────────────────

/// Score a raw feature slice.
///
/// Only the first four features are read; extra trailing features are ignored.
pub fn predict_outcome(features: &[f64], config: &ModelConfig) -> Result<OutcomeProbabilities> {
    if features.len() < MIN_FEATURES {
        return Err(Error::InvalidInput(format!(
            "expected at least {} features, got {}",
            MIN_FEATURES,
            features.len()
        )));
    }

    let elo_diff = features[2];
    let is_knockout = features[3];
    if elo_diff.is_nan() {
        return Ok(OutcomeProbabilities::uniform());
    }

    let mut base = elo_diff / config.elo_scale;
    if is_knockout > 0.5 {
        base *= config.knockout_multiplier;
    }
    let home_edge = sigmoid(base);

    // min/max rather than clamp: an inverted floor/ceiling must not panic.
    let draw = (config.draw_ceiling - elo_diff.abs() * config.draw_decay_per_elo)
        .min(config.draw_ceiling)
        .max(config.draw_floor);

    let remaining = 1.0 - draw;
    Ok(normalize(
        remaining * home_edge,
        draw,
        remaining * (1.0 - home_edge),
    ))
}

/// Clip to non-negative and rescale so the triple sums to 1.
///
/// Non-finite components count as zero. A zero or non-finite total falls
/// back to 1/3 each.
pub fn normalize(home: f64, draw: f64, away: f64) -> OutcomeProbabilities {
    let clip = |p: f64| if p.is_finite() { p.max(0.0) } else { 0.0 };
    let (home, draw, away) = (clip(home), clip(draw), clip(away));

    let total = home + draw + away;
    if !total.is_finite() || total <= 0.0 {
        return OutcomeProbabilities::uniform();
    }

    OutcomeProbabilities::new(home / total, draw / total, away / total)
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ModelConfig {
        ModelConfig::default()
    }

    fn assert_valid(p: &OutcomeProbabilities) {
        assert!(
            (p.total() - 1.0).abs() < 1e-6,
            "sum={} should be 1.0",
            p.total()
        );
        for v in [p.home_win_prob, p.draw_prob, p.away_win_prob] {
            assert!((0.0..=1.0).contains(&v), "component {} out of [0,1]", v);
        }
    }

    #[test]
    fn test_sigmoid_known_values() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(10.0) > 0.9999);
        assert!(sigmoid(-10.0) < 0.0001);
    }

    #[test]
    fn test_probabilities_valid_across_range() {
        for diff in [-2000.0, -600.0, -250.0, -1.0, 0.0, 1.0, 75.0, 400.0, 3000.0] {
            for knockout in [0.0, 1.0] {
                let features = [1500.0 + diff, 1500.0, diff, knockout];
                let p = predict_outcome(&features, &cfg()).unwrap();
                assert_valid(&p);
            }
        }
    }

    #[test]
    fn test_even_match_draw_at_ceiling() {
        let p = predict_outcome(&[0.0, 0.0, 0.0, 0.0], &cfg()).unwrap();
        assert!((p.draw_prob - 0.35).abs() < 1e-9, "draw={}", p.draw_prob);
        assert!(
            (p.home_win_prob - p.away_win_prob).abs() < 1e-9,
            "home={} away={}",
            p.home_win_prob,
            p.away_win_prob
        );
        assert_valid(&p);

        let p = predict_outcome(&[1800.0, 1800.0, 0.0, 0.0], &cfg()).unwrap();
        assert!((p.draw_prob - 0.35).abs() < 1e-9);
        assert!((p.home_win_prob - p.away_win_prob).abs() < 1e-9);
    }

    #[test]
    fn test_final_small_edge() {
        // ARG 2100 vs FRA 2050 in the final.
        let p = predict_outcome(&[2100.0, 2050.0, 50.0, 1.0], &cfg()).unwrap();
        assert!(p.home_win_prob > p.away_win_prob);
        assert!(p.draw_prob >= 0.15, "draw={} below floor", p.draw_prob);
        assert!((p.draw_prob - 0.30).abs() < 1e-9, "draw={}", p.draw_prob);
        // Small edge stays near even.
        assert!(p.home_win_prob - p.away_win_prob < 0.15);
        assert_valid(&p);
    }

    #[test]
    fn test_knockout_widens_edge() {
        let group = predict_outcome(&[2100.0, 2050.0, 50.0, 0.0], &cfg()).unwrap();
        let knockout = predict_outcome(&[2100.0, 2050.0, 50.0, 1.0], &cfg()).unwrap();
        assert!(knockout.home_win_prob > group.home_win_prob);
    }

    #[test]
    fn test_lopsided_match_draw_floor() {
        let p = predict_outcome(&[2400.0, 1400.0, 1000.0, 0.0], &cfg()).unwrap();
        assert!((p.draw_prob - 0.15).abs() < 1e-9, "draw={}", p.draw_prob);
        assert!(p.home_win_prob > 0.8);
    }

    #[test]
    fn test_symmetry_of_rating_gap() {
        let home_fav = predict_outcome(&[1700.0, 1500.0, 200.0, 0.0], &cfg()).unwrap();
        let away_fav = predict_outcome(&[1500.0, 1700.0, -200.0, 0.0], &cfg()).unwrap();
        assert!((home_fav.home_win_prob - away_fav.away_win_prob).abs() < 1e-9);
        assert!((home_fav.draw_prob - away_fav.draw_prob).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_features() {
        let err = predict_outcome(&[1.0, 2.0, 3.0], &cfg()).unwrap_err();
        assert!(err.to_string().contains("at least 4"), "err={}", err);
        assert!(predict_outcome(&[], &cfg()).is_err());
    }

    #[test]
    fn test_extra_features_ignored() {
        let base = predict_outcome(&[2100.0, 2050.0, 50.0, 1.0], &cfg()).unwrap();
        let extra = predict_outcome(&[2100.0, 2050.0, 50.0, 1.0, 7.0, -3.0], &cfg()).unwrap();
        assert_eq!(base, extra);
    }

    #[test]
    fn test_non_finite_input_falls_back_to_uniform() {
        let p = predict_outcome(&[f64::NAN, 1500.0, f64::NAN, 0.0], &cfg()).unwrap();
        assert_eq!(p, OutcomeProbabilities::uniform());
    }

    #[test]
    fn test_inverted_draw_bounds_do_not_panic() {
        let config = ModelConfig {
            draw_floor: 0.4,
            draw_ceiling: 0.2,
            ..ModelConfig::default()
        };
        let p = predict_outcome(&[2100.0, 2050.0, 50.0, 1.0], &config).unwrap();
        assert!((p.draw_prob - 0.4).abs() < 1e-9, "draw={}", p.draw_prob);
        assert_valid(&p);
    }

    #[test]
    fn test_nan_config_still_yields_valid_triple() {
        let config = ModelConfig {
            elo_scale: f64::NAN,
            ..ModelConfig::default()
        };
        let p = predict_outcome(&[2100.0, 2050.0, 50.0, 1.0], &config).unwrap();
        assert_valid(&p);
    }

    // ── Normalization ──────────────────────────────────────────────────

    #[test]
    fn test_normalize_clips_negative() {
        let p = normalize(0.6, 0.5, -0.1);
        assert_eq!(p.away_win_prob, 0.0);
        assert!((p.home_win_prob - 0.6 / 1.1).abs() < 1e-12);
        assert_valid(&p);
    }

    #[test]
    fn test_normalize_degenerate() {
        assert_eq!(normalize(0.0, 0.0, 0.0), OutcomeProbabilities::uniform());
        assert_eq!(normalize(-1.0, -2.0, 0.0), OutcomeProbabilities::uniform());
        assert_eq!(
            normalize(f64::INFINITY, 0.2, 0.3),
            OutcomeProbabilities::new(0.0, 0.4, 0.6)
        );
    }
}
