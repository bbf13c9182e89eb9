//! confidence.rs — Descriptive [0, 1] confidence for a computed score.
//!
//! Blends two signals: the fraction of exact matches among the ingredient
//! factor lookups (approximate counts half, missing counts zero) and the
//! fraction of optional input categories that were provided. Purely
//! descriptive — the numeric score never depends on it.

use crate::model::{clamp01, MatchQuality};

/// Which optional input categories the caller supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct Completeness {
    pub transport: bool,
    pub packaging: bool,
    pub labels: bool,
}

impl Completeness {
    fn fraction(&self) -> f32 {
        let provided = [self.transport, self.packaging, self.labels]
            .iter()
            .filter(|b| **b)
            .count();
        provided as f32 / 3.0
    }
}

const MATCH_WEIGHT: f32 = 0.7;
const COMPLETENESS_WEIGHT: f32 = 0.3;
const APPROXIMATE_CREDIT: f32 = 0.5;

/// Credit per match quality: exact 1.0, approximate 0.5, missing 0.0.
fn quality_credit(q: MatchQuality) -> f32 {
    match q {
        MatchQuality::Exact => 1.0,
        MatchQuality::Approximate => APPROXIMATE_CREDIT,
        MatchQuality::Missing => 0.0,
    }
}

/// Estimate confidence from the resolver's match tags and the completeness
/// flags. An empty or all-missing ingredient list with no optional inputs
/// yields 0.0, the defined minimum.
pub fn estimate(qualities: &[MatchQuality], completeness: &Completeness) -> f32 {
    let match_fraction = if qualities.is_empty() {
        0.0
    } else {
        qualities.iter().map(|q| quality_credit(*q)).sum::<f32>() / qualities.len() as f32
    };

    clamp01(MATCH_WEIGHT * match_fraction + COMPLETENESS_WEIGHT * completeness.fraction())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: Completeness = Completeness {
        transport: true,
        packaging: true,
        labels: true,
    };

    #[test]
    fn fully_resolved_and_complete_is_one() {
        let c = estimate(&[MatchQuality::Exact, MatchQuality::Exact], &ALL);
        assert!((c - 1.0).abs() < 1e-6);
    }

    #[test]
    fn all_missing_with_nothing_optional_is_the_minimum() {
        let c = estimate(
            &[MatchQuality::Missing, MatchQuality::Missing],
            &Completeness::default(),
        );
        assert_eq!(c, 0.0);
    }

    #[test]
    fn empty_list_is_the_minimum_too() {
        assert_eq!(estimate(&[], &Completeness::default()), 0.0);
    }

    #[test]
    fn half_missing_halves_the_match_component() {
        // One exact + one missing, no optional inputs: exactly half of the
        // fully-resolved baseline.
        let baseline = estimate(
            &[MatchQuality::Exact, MatchQuality::Exact],
            &Completeness::default(),
        );
        let c = estimate(
            &[MatchQuality::Exact, MatchQuality::Missing],
            &Completeness::default(),
        );
        assert!((c - baseline / 2.0).abs() < 1e-6);
    }

    #[test]
    fn approximate_counts_half() {
        let c = estimate(&[MatchQuality::Approximate], &Completeness::default());
        assert!((c - 0.7 * 0.5).abs() < 1e-6);
    }

    #[test]
    fn always_within_bounds() {
        for qs in [
            vec![],
            vec![MatchQuality::Exact; 10],
            vec![MatchQuality::Missing; 10],
        ] {
            let c = estimate(&qs, &ALL);
            assert!((0.0..=1.0).contains(&c));
        }
    }
}
