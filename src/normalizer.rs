//! normalizer.rs — LCA indicators → raw numeric score in [0, 100].
//!
//! Each indicator is min-max scaled against the dataset's reference range
//! and clipped to [0, 1]; the weighted sum is scaled to [0, 100]. Orientation
//! is "lower = better": 0 is the lowest impact, 100 the highest. Label
//! bonus/malus adjustments are bounded, deterministic, and clamped so the
//! final score stays in range.

use crate::config::{ScoreWeights, ScoringConfig};
use crate::dataset::{ReferenceRange, ReferenceRanges};
use crate::model::{AppliedAdjustment, Indicators};

/// Normalized indicator values in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalized {
    pub co2: f64,
    pub water: f64,
    pub energy: f64,
}

/// clip((value - min) / (max - min), 0, 1)
pub fn normalize_indicator(value: f64, range: &ReferenceRange) -> f64 {
    let span = range.max - range.min;
    if span <= 0.0 {
        return 0.5;
    }
    ((value - range.min) / span).clamp(0.0, 1.0)
}

pub fn normalize(totals: &Indicators, ranges: &ReferenceRanges) -> Normalized {
    Normalized {
        co2: normalize_indicator(totals.co2_kg, &ranges.co2),
        water: normalize_indicator(totals.water_l, &ranges.water),
        energy: normalize_indicator(totals.energy_mj, &ranges.energy),
    }
}

/// Weighted sum of normalized indicators, scaled to [0, 100]. The config
/// loader guarantees the weights sum to 1, so no renormalization here.
pub fn weighted_score(norm: &Normalized, weights: &ScoreWeights) -> f64 {
    let raw = norm.co2 * weights.co2 + norm.water * weights.water + norm.energy * weights.energy;
    (raw * 100.0).clamp(0.0, 100.0)
}

/// Apply the recognized labels from the fixed adjustment table. Unrecognized
/// labels are ignored. Returns the clamped score and the applied adjustments
/// for explainability.
pub fn apply_labels(
    base: f64,
    labels: &[String],
    cfg: &ScoringConfig,
) -> (f64, Vec<AppliedAdjustment>) {
    let mut applied = Vec::new();
    let mut total = 0.0;
    for label in labels {
        let key = crate::dataset::normalize_key(label);
        if let Some(points) = cfg.labels.get(&key) {
            total += points;
            applied.push(AppliedAdjustment {
                label: key,
                points: *points,
            });
        }
    }
    ((base + total).clamp(0.0, 100.0), applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::dataset::Dataset;

    fn ranges() -> ReferenceRanges {
        Dataset::default_seed().reference_ranges
    }

    #[test]
    fn values_below_min_clip_to_zero_and_above_max_to_one() {
        let r = ranges();
        assert_eq!(normalize_indicator(0.0, &r.co2), 0.0);
        assert_eq!(normalize_indicator(50.0, &r.co2), 1.0);
        let mid = normalize_indicator(1.55, &r.co2); // midpoint of 0.1..3.0
        assert!((mid - 0.5).abs() < 1e-9);
    }

    #[test]
    fn zero_impact_scores_zero() {
        // Zero-impact LCA with weights {0.5, 0.3, 0.2} scores 0.
        let cfg = ScoringConfig::default_seed();
        let norm = normalize(&Indicators::default(), &ranges());
        assert_eq!(weighted_score(&norm, &cfg.weights), 0.0);
    }

    #[test]
    fn worst_case_scores_one_hundred() {
        let cfg = ScoringConfig::default_seed();
        let norm = Normalized {
            co2: 1.0,
            water: 1.0,
            energy: 1.0,
        };
        assert!((weighted_score(&norm, &cfg.weights) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn increasing_one_indicator_never_lowers_the_score() {
        let cfg = ScoringConfig::default_seed();
        let r = ranges();
        let mut prev = 0.0;
        for step in 0..=20 {
            let co2 = step as f64 * 0.25;
            let norm = normalize(
                &Indicators {
                    co2_kg: co2,
                    water_l: 400.0,
                    energy_mj: 3.0,
                },
                &r,
            );
            let s = weighted_score(&norm, &cfg.weights);
            assert!(
                s >= prev - 1e-12,
                "score decreased from {prev} to {s} at co2 {co2}"
            );
            prev = s;
        }
    }

    #[test]
    fn labels_adjust_and_clamp() {
        let cfg = ScoringConfig::default_seed();
        let (s, applied) = apply_labels(50.0, &["organic".into(), "fair_trade".into()], &cfg);
        assert!((s - 37.0).abs() < 1e-9); // 50 - 10 - 3
        assert_eq!(applied.len(), 2);

        let (low, _) = apply_labels(5.0, &["organic".into()], &cfg);
        assert_eq!(low, 0.0); // clamped at the floor

        let (same, applied) = apply_labels(42.0, &["no_such_label".into()], &cfg);
        assert_eq!(same, 42.0);
        assert!(applied.is_empty());
    }
}
