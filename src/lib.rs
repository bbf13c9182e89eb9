// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregator;
pub mod api;
pub mod confidence;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod grade;
pub mod history;
pub mod metrics;
pub mod model;
pub mod normalizer;
pub mod provenance;
pub mod resolver;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::{ScoreWeights, ScoringConfig};
pub use crate::dataset::{Dataset, DatasetStore, ImpactFactor};
pub use crate::error::EcoError;
pub use crate::model::{
    EcoScore, Grade, Ingredient, LcaRequest, LcaResult, MatchQuality, PackagingItem, TransportLeg,
};
pub use crate::provenance::{NewProvenance, ProvenanceRecord, ProvenanceStore};

use axum::Router;

/// Build the router over a default-bootstrapped state: seeded datasets plus
/// whatever `ECO_DATASET_PATH` / `ECO_SCORING_CONFIG_PATH` point at. Used by
/// the binary and the integration tests.
pub fn app() -> Result<Router, EcoError> {
    let state = api::AppState::bootstrap()?;
    Ok(api::create_router(state))
}
