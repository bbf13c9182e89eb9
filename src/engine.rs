//! # Scoring Engine
//! Pure, testable composition of the pipeline stages: aggregate → normalize →
//! weight → adjust → classify, plus the confidence estimate. No I/O; the
//! dataset snapshot and scoring config are passed in by the caller, so a
//! fixed input always produces an identical `EcoScore`.

use crate::aggregator;
use crate::confidence::{self, Completeness};
use crate::config::ScoringConfig;
use crate::dataset::Dataset;
use crate::error::EcoError;
use crate::grade;
use crate::model::{EcoScore, LcaRequest, LcaResult};
use crate::normalizer;

/// `ComputeLCA`: resolve, aggregate, and break down one request.
pub fn compute_lca(req: &LcaRequest, dataset: &Dataset) -> Result<LcaResult, EcoError> {
    aggregator::compute_lca(req, dataset)
}

/// `ComputeScore`: LCA result + scoring config + labels → final eco-score.
///
/// The dataset supplies the reference ranges the normalizer scales against;
/// it must be the same version the LCA was aggregated with. The config is
/// validated at load time, so this function cannot fail. Orientation is
/// "lower = better" throughout.
pub fn compute_score(
    lca: &LcaResult,
    dataset: &Dataset,
    cfg: &ScoringConfig,
    labels: &[String],
) -> EcoScore {
    let norm = normalizer::normalize(&lca.totals(), &dataset.reference_ranges);
    let base = normalizer::weighted_score(&norm, &cfg.weights);
    let (numeric, adjustments) = normalizer::apply_labels(base, labels, cfg);

    let band = grade::classify(&cfg.grades, numeric);

    let completeness = Completeness {
        transport: lca.transport_provided,
        packaging: lca.packaging_provided,
        labels: !labels.is_empty(),
    };
    let confidence = confidence::estimate(&lca.ingredient_qualities(), &completeness);

    EcoScore {
        numeric,
        letter: band.grade,
        color: band.color.clone(),
        confidence,
        weights_version: cfg.version.clone(),
        adjustments,
    }
}

/// Full pipeline helper used by the HTTP surface and tests: LCA then score
/// in one deterministic pass against a single dataset snapshot.
pub fn compute_product_score(
    req: &LcaRequest,
    dataset: &Dataset,
    cfg: &ScoringConfig,
    labels: &[String],
) -> Result<(LcaResult, EcoScore), EcoError> {
    let lca = compute_lca(req, dataset)?;
    let score = compute_score(&lca, dataset, cfg, labels);
    Ok((lca, score))
}
