//! config.rs — Versioned scoring configuration: indicator weights, grade
//! threshold bands, and the label bonus/malus table.
//!
//! Loaded once per process from TOML (`ECO_SCORING_CONFIG_PATH`, default
//! `config/scoring.toml`) and validated eagerly: weights must sum to 1.0
//! (±1e-6) and the grade bands must cover [0, 100] contiguously. Invalid
//! configuration blocks startup; it is never a per-request error. A missing
//! file falls back to the built-in seed, like the other config loaders here.
//!
//! The `version` string travels through every computation and into the
//! provenance record, so a score stays reproducible after recalibration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::EcoError;
use crate::model::Grade;

pub const DEFAULT_SCORING_CONFIG_PATH: &str = "config/scoring.toml";
pub const ENV_SCORING_CONFIG_PATH: &str = "ECO_SCORING_CONFIG_PATH";

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;
/// Bound on a single label adjustment, in score points.
const MAX_LABEL_ADJUSTMENT: f64 = 20.0;

/// Indicator weights. Must sum to 1.0 within tolerance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub co2: f64,
    pub water: f64,
    pub energy: f64,
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.co2 + self.water + self.energy
    }
}

/// One grade band: lower bound inclusive, upper bound exclusive, except the
/// final band which includes its upper bound (100).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeBand {
    pub grade: Grade,
    pub min: f64,
    pub max: f64,
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Weights/threshold calibration version, e.g. "2024.1".
    pub version: String,
    pub weights: ScoreWeights,
    pub grades: Vec<GradeBand>,
    /// Label → signed point adjustment (negative improves the grade).
    #[serde(default)]
    pub labels: HashMap<String, f64>,
}

impl ScoringConfig {
    /// Load from the env-configured path. A missing file falls back to the
    /// seed; a present but invalid file is fatal.
    pub fn from_toml() -> Result<Self, EcoError> {
        let path = std::env::var(ENV_SCORING_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_SCORING_CONFIG_PATH.to_string());
        Self::load_from_file(path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, EcoError> {
        let raw = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(_) => {
                warn!(
                    path = %path.as_ref().display(),
                    "no scoring config file found, using built-in seed"
                );
                return Ok(Self::default_seed());
            }
        };
        let cfg: ScoringConfig = toml::from_str(&raw)
            .map_err(|e| EcoError::configuration(format!("invalid scoring config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject bad calibration before it can influence any score.
    pub fn validate(&self) -> Result<(), EcoError> {
        if self.version.trim().is_empty() {
            return Err(EcoError::configuration("scoring version must not be empty"));
        }

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EcoError::configuration(format!(
                "indicator weights sum to {sum}, expected 1.0 (±{WEIGHT_SUM_TOLERANCE})"
            )));
        }
        if self.weights.co2 < 0.0 || self.weights.water < 0.0 || self.weights.energy < 0.0 {
            return Err(EcoError::configuration("indicator weights must be >= 0"));
        }

        crate::grade::validate_bands(&self.grades)?;

        for (label, points) in &self.labels {
            if points.abs() > MAX_LABEL_ADJUSTMENT {
                return Err(EcoError::configuration(format!(
                    "label adjustment '{label}' = {points} exceeds ±{MAX_LABEL_ADJUSTMENT} points"
                )));
            }
        }
        Ok(())
    }

    /// Built-in calibration seed: CO2 weighted highest, standard A–E bands,
    /// and the label table used by the upstream score calculator.
    pub fn default_seed() -> Self {
        let mut labels = HashMap::new();
        for (label, points) in [
            // bonuses (reduce score = improve grade)
            ("organic", -10.0),
            ("local_sourcing", -8.0),
            ("recyclable_packaging", -5.0),
            ("fair_trade", -3.0),
            // malus (increase score = worsen grade)
            ("excessive_packaging", 5.0),
            ("long_distance_transport", 7.0),
            ("deforestation_risk", 12.0),
            ("endangered_species", 15.0),
        ] {
            labels.insert(label.to_string(), points);
        }

        Self {
            version: "seed-2024.1".to_string(),
            weights: ScoreWeights {
                co2: 0.5,
                water: 0.3,
                energy: 0.2,
            },
            grades: vec![
                band(Grade::A, 0.0, 20.0, "#1E8449"),
                band(Grade::B, 20.0, 40.0, "#82E0AA"),
                band(Grade::C, 40.0, 60.0, "#F4D03F"),
                band(Grade::D, 60.0, 80.0, "#E67E22"),
                band(Grade::E, 80.0, 100.0, "#E74C3C"),
            ],
            labels,
        }
    }
}

fn band(grade: Grade, min: f64, max: f64, color: &str) -> GradeBand {
    GradeBand {
        grade,
        min,
        max,
        color: color.to_string(),
    }
}
