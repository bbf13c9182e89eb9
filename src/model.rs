//! model.rs — Request-scoped data model: ingredients, transport legs,
//! packaging, LCA results with a replayable breakdown, and the final
//! eco-score with explainable adjustments.
//!
//! Everything here is plain serde data. Reference data (impact factors,
//! weights, thresholds) lives in `dataset` / `config`; computation lives in
//! `aggregator` / `engine`.

use serde::{Deserialize, Serialize};

use crate::dataset::{ImpactFactor, TransportFactor};

/// One ingredient as extracted upstream. `mass_fraction` is the share of the
/// product mass in [0, 1]; if every fraction in a request is absent or zero,
/// the aggregator falls back to a uniform distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    /// Canonical lookup key. Derived from `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_name: Option<String>,
    #[serde(default)]
    pub mass_fraction: f64,
    /// Fallback category for the two-tier factor resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, mass_fraction: f64) -> Self {
        Self {
            name: name.into(),
            normalized_name: None,
            mass_fraction,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// The key used against the dataset: explicit `normalized_name` wins.
    pub fn lookup_key(&self) -> String {
        match &self.normalized_name {
            Some(n) => crate::dataset::normalize_key(n),
            None => crate::dataset::normalize_key(&self.name),
        }
    }
}

/// One transport leg. `mode` is resolved against the dataset's mode table so
/// new modes can ship with a dataset version instead of a code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportLeg {
    pub mode: String,
    pub distance_km: f64,
    pub mass_kg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagingItem {
    pub material: String,
    pub mass_g: f64,
}

/// How an impact factor was obtained for a breakdown entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    /// Direct hit in the dataset's factor table.
    Exact,
    /// Category-level average used as fallback.
    Approximate,
    /// No factor and no category fallback; excluded from the totals.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionKind {
    Ingredient,
    Transport,
    Packaging,
}

/// The three LCA indicators. Used both for totals and for per-source
/// contributions in the breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    pub co2_kg: f64,
    pub water_l: f64,
    pub energy_mj: f64,
}

impl Indicators {
    pub fn add(&mut self, other: &Indicators) {
        self.co2_kg += other.co2_kg;
        self.water_l += other.water_l;
        self.energy_mj += other.energy_mj;
    }

    pub fn is_zero(&self) -> bool {
        self.co2_kg == 0.0 && self.water_l == 0.0 && self.energy_mj == 0.0
    }
}

/// The factor applied to one breakdown entry, kept verbatim so the
/// calculation is replayable without re-reading the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactorUsed {
    /// Per-kg ingredient or packaging factor.
    PerKg(ImpactFactor),
    /// Per-ton-km transport mode factor.
    PerTonKm(TransportFactor),
}

/// One audited contribution to the LCA totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub kind: ContributionKind,
    /// Ingredient name, transport mode, or packaging material.
    pub label: String,
    pub quality: MatchQuality,
    pub contribution: Indicators,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor_used: Option<FactorUsed>,
    pub dataset_version: String,
}

/// Input contract of `ComputeLCA`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LcaRequest {
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub transport: Vec<TransportLeg>,
    #[serde(default)]
    pub packaging: Vec<PackagingItem>,
    pub dataset_version: String,
}

/// Output of the LCA Aggregator: totals plus the full per-source breakdown
/// and any non-fatal warnings collected along the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LcaResult {
    pub co2_kg: f64,
    pub water_l: f64,
    pub energy_mj: f64,
    pub dataset_version: String,
    pub breakdown: Vec<BreakdownEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Completeness flags consumed by the Confidence Estimator.
    #[serde(default)]
    pub transport_provided: bool,
    #[serde(default)]
    pub packaging_provided: bool,
}

impl LcaResult {
    pub fn totals(&self) -> Indicators {
        Indicators {
            co2_kg: self.co2_kg,
            water_l: self.water_l,
            energy_mj: self.energy_mj,
        }
    }

    /// Match-quality tags of the ingredient entries, in input order.
    pub fn ingredient_qualities(&self) -> Vec<MatchQuality> {
        self.breakdown
            .iter()
            .filter(|e| e.kind == ContributionKind::Ingredient)
            .map(|e| e.quality)
            .collect()
    }
}

/// Letter grade. Thresholds and colors are configuration (`config::GradeBand`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        }
    }
}

/// One label bonus/malus that was actually applied to a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedAdjustment {
    pub label: String,
    /// Signed points; negative improves the grade (lower = better).
    pub points: f64,
}

/// Final score. `numeric` uses the "lower = better" orientation: 0 is the
/// best possible impact, 100 the worst.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcoScore {
    pub numeric: f64,
    pub letter: Grade,
    pub color: String,
    pub confidence: f32,
    pub weights_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<AppliedAdjustment>,
}

pub(crate) fn clamp01(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}
