//! resolver.rs — Two-tier impact-factor resolution.
//!
//! Policy: exact name lookup → category-level average → `MissingData`.
//! Every outcome carries a match-quality tag; the aggregator keeps the tag in
//! the breakdown and the Confidence Estimator consumes it later. A missing
//! factor is a per-ingredient condition, not a pipeline abort.

use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::EcoError;
use crate::model::MatchQuality;

/// A resolved factor together with how it was obtained.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub factor: crate::dataset::ImpactFactor,
    pub quality: MatchQuality,
}

/// Resolve an ingredient's impact factor against one dataset version.
///
/// `key` must already be normalized (see `Ingredient::lookup_key`).
pub fn resolve(
    dataset: &Dataset,
    key: &str,
    category: Option<&str>,
) -> Result<Resolved, EcoError> {
    if let Some(factor) = dataset.exact_factor(key) {
        return Ok(Resolved {
            factor: factor.clone(),
            quality: MatchQuality::Exact,
        });
    }

    if let Some(cat) = category {
        if let Some(factor) = dataset.category_factor(cat) {
            return Ok(Resolved {
                factor: factor.clone(),
                quality: MatchQuality::Approximate,
            });
        }
    }

    Err(EcoError::missing(key, &dataset.version))
}

/// Factor lookup for the debug endpoint: what would this name resolve to?
#[derive(Debug, Clone, Serialize)]
pub struct FactorInfo {
    pub ingredient: String,
    pub dataset_version: String,
    pub has_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co2_per_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_per_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_per_kg: Option<f64>,
}

pub fn factor_info(dataset: &Dataset, name: &str) -> FactorInfo {
    let key = crate::dataset::normalize_key(name);
    match dataset.exact_factor(&key) {
        Some(f) => FactorInfo {
            ingredient: name.to_string(),
            dataset_version: dataset.version.clone(),
            has_data: true,
            co2_per_kg: Some(f.co2_per_kg),
            water_per_kg: Some(f.water_per_kg),
            energy_per_kg: Some(f.energy_per_kg),
        },
        None => FactorInfo {
            ingredient: name.to_string(),
            dataset_version: dataset.version.clone(),
            has_data: false,
            co2_per_kg: None,
            water_per_kg: None,
            energy_per_kg: None,
        },
    }
}
