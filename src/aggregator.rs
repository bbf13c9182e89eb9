//! # LCA Aggregator
//! Pure combination of per-ingredient impacts (weighted by mass fraction),
//! transport legs, and packaging into one `LcaResult` with a replayable
//! breakdown. No I/O; the dataset snapshot is passed in by the caller.
//!
//! Recovery policy: a missing factor excludes that item from the totals and
//! leaves a tagged breakdown entry plus a warning. Only malformed input
//! (negative mass, fraction sum > 1) rejects the whole request.

use tracing::warn;

use crate::dataset::Dataset;
use crate::error::EcoError;
use crate::model::{
    BreakdownEntry, ContributionKind, FactorUsed, Indicators, LcaRequest, LcaResult, MatchQuality,
};
use crate::resolver;

const FRACTION_SUM_TOLERANCE: f64 = 1e-6;

/// Compute the LCA result for one request against one dataset snapshot.
pub fn compute_lca(req: &LcaRequest, dataset: &Dataset) -> Result<LcaResult, EcoError> {
    validate(req)?;

    let fractions = effective_fractions(req);

    let mut totals = Indicators::default();
    let mut breakdown = Vec::new();
    let mut warnings = Vec::new();

    if req.ingredients.is_empty() {
        warnings.push("empty ingredient list: totals are zero, confidence will be low".to_string());
    }

    // Ingredient contribution = sum(fraction_i * factor_i) per indicator.
    for (ing, fraction) in req.ingredients.iter().zip(fractions.iter()) {
        let key = ing.lookup_key();
        match resolver::resolve(dataset, &key, ing.category.as_deref()) {
            Ok(resolved) => {
                let contribution = Indicators {
                    co2_kg: fraction * resolved.factor.co2_per_kg,
                    water_l: fraction * resolved.factor.water_per_kg,
                    energy_mj: fraction * resolved.factor.energy_per_kg,
                };
                totals.add(&contribution);
                if resolved.quality == MatchQuality::Approximate {
                    warnings.push(format!(
                        "approximate factor for '{}' (category '{}')",
                        ing.name,
                        ing.category.as_deref().unwrap_or("?")
                    ));
                }
                breakdown.push(BreakdownEntry {
                    kind: ContributionKind::Ingredient,
                    label: ing.name.clone(),
                    quality: resolved.quality,
                    contribution,
                    factor_used: Some(FactorUsed::PerKg(resolved.factor)),
                    dataset_version: dataset.version.clone(),
                });
            }
            Err(EcoError::MissingData { .. }) => {
                warn!(ingredient = %ing.name, dataset = %dataset.version, "no impact factor, excluding from totals");
                warnings.push(format!(
                    "no impact factor for '{}' in dataset '{}': excluded from totals",
                    ing.name, dataset.version
                ));
                breakdown.push(BreakdownEntry {
                    kind: ContributionKind::Ingredient,
                    label: ing.name.clone(),
                    quality: MatchQuality::Missing,
                    contribution: Indicators::default(),
                    factor_used: None,
                    dataset_version: dataset.version.clone(),
                });
            }
            Err(other) => return Err(other),
        }
    }

    // Transport contribution = distance_km * mass_kg/1000 * per-ton-km factor.
    for leg in &req.transport {
        match dataset.transport_factor(&leg.mode) {
            Some(factor) => {
                let ton_km = leg.distance_km * leg.mass_kg / 1000.0;
                let contribution = Indicators {
                    co2_kg: ton_km * factor.co2_per_tkm,
                    water_l: 0.0,
                    energy_mj: ton_km * factor.energy_per_tkm,
                };
                totals.add(&contribution);
                breakdown.push(BreakdownEntry {
                    kind: ContributionKind::Transport,
                    label: leg.mode.clone(),
                    quality: MatchQuality::Exact,
                    contribution,
                    factor_used: Some(FactorUsed::PerTonKm(factor.clone())),
                    dataset_version: dataset.version.clone(),
                });
            }
            None => {
                warnings.push(format!(
                    "unknown transport mode '{}' in dataset '{}': leg excluded",
                    leg.mode, dataset.version
                ));
            }
        }
    }

    // Packaging contribution = mass_g/1000 * per-kg material factor.
    for item in &req.packaging {
        match dataset.packaging_factor(&item.material) {
            Some(factor) => {
                let mass_kg = item.mass_g / 1000.0;
                let contribution = Indicators {
                    co2_kg: mass_kg * factor.co2_per_kg,
                    water_l: mass_kg * factor.water_per_kg,
                    energy_mj: mass_kg * factor.energy_per_kg,
                };
                totals.add(&contribution);
                breakdown.push(BreakdownEntry {
                    kind: ContributionKind::Packaging,
                    label: item.material.clone(),
                    quality: MatchQuality::Exact,
                    contribution,
                    factor_used: Some(FactorUsed::PerKg(factor.clone())),
                    dataset_version: dataset.version.clone(),
                });
            }
            None => {
                warnings.push(format!(
                    "unknown packaging material '{}' in dataset '{}': item excluded",
                    item.material, dataset.version
                ));
            }
        }
    }

    Ok(LcaResult {
        co2_kg: totals.co2_kg,
        water_l: totals.water_l,
        energy_mj: totals.energy_mj,
        dataset_version: dataset.version.clone(),
        breakdown,
        warnings,
        transport_provided: !req.transport.is_empty(),
        packaging_provided: !req.packaging.is_empty(),
    })
}

/// Reject malformed input before any computation.
fn validate(req: &LcaRequest) -> Result<(), EcoError> {
    if req.dataset_version.trim().is_empty() {
        return Err(EcoError::validation("dataset_version must not be empty"));
    }

    let mut sum = 0.0;
    for ing in &req.ingredients {
        if ing.name.trim().is_empty() {
            return Err(EcoError::validation("ingredient name must not be empty"));
        }
        if !(0.0..=1.0).contains(&ing.mass_fraction) {
            return Err(EcoError::validation(format!(
                "mass_fraction for '{}' must be in [0, 1], got {}",
                ing.name, ing.mass_fraction
            )));
        }
        sum += ing.mass_fraction;
    }
    if sum > 1.0 + FRACTION_SUM_TOLERANCE {
        return Err(EcoError::validation(format!(
            "mass fractions sum to {sum:.6}, which exceeds 1"
        )));
    }

    // NaN/infinity would poison the totals silently; reject up front.
    for leg in &req.transport {
        if !leg.distance_km.is_finite()
            || !leg.mass_kg.is_finite()
            || leg.distance_km < 0.0
            || leg.mass_kg < 0.0
        {
            return Err(EcoError::validation(format!(
                "transport leg '{}' has negative or non-finite distance or mass",
                leg.mode
            )));
        }
    }
    for item in &req.packaging {
        if !item.mass_g.is_finite() || item.mass_g < 0.0 {
            return Err(EcoError::validation(format!(
                "packaging item '{}' has negative or non-finite mass",
                item.material
            )));
        }
    }
    Ok(())
}

/// Per-ingredient fractions actually used: the declared ones, or a uniform
/// 1/n split when all declared fractions are absent/zero.
fn effective_fractions(req: &LcaRequest) -> Vec<f64> {
    let declared: Vec<f64> = req.ingredients.iter().map(|i| i.mass_fraction).collect();
    let sum: f64 = declared.iter().sum();
    if sum == 0.0 && !declared.is_empty() {
        let uniform = 1.0 / declared.len() as f64;
        return vec![uniform; declared.len()];
    }
    declared
}
