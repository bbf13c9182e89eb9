use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::counter;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::config::ScoringConfig;
use crate::dataset::{DatasetStore, DEFAULT_DATASET_PATH, ENV_DATASET_PATH};
use crate::engine;
use crate::error::EcoError;
use crate::history::{History, HistoryEntry};
use crate::model::{EcoScore, LcaRequest, LcaResult};
use crate::provenance::{NewProvenance, ProvenanceRecord, ProvenanceStore};
use crate::resolver;

#[derive(Clone)]
pub struct AppState {
    pub datasets: Arc<DatasetStore>,
    pub scoring: Arc<ScoringConfig>,
    pub provenance: Arc<ProvenanceStore>,
    pub history: Arc<History>,
}

impl AppState {
    /// Default state: seeded datasets (overlaid by `ECO_DATASET_PATH` if the
    /// file exists) and the TOML scoring config. Configuration errors are
    /// fatal here, before any request is served.
    pub fn bootstrap() -> Result<Self, EcoError> {
        Ok(Self {
            datasets: Arc::new(DatasetStore::bootstrap()?),
            scoring: Arc::new(ScoringConfig::from_toml()?),
            provenance: Arc::new(ProvenanceStore::new()),
            history: Arc::new(History::with_capacity(2000)),
        })
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/lca/compute", post(compute_lca))
        .route("/score/compute", post(compute_score))
        .route("/score/full", post(score_full))
        .route("/provenance/record", post(record_provenance))
        .route("/provenance/{score_id}/lineage", get(get_lineage))
        .route("/provenance/descendants/{artifact_id}", get(get_descendants))
        .route("/debug/factor", get(debug_factor))
        .route("/debug/history", get(debug_history))
        .route("/admin/reload-dataset", get(admin_reload_dataset))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

impl IntoResponse for EcoError {
    fn into_response(self) -> Response {
        let status = match &self {
            EcoError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EcoError::MissingData { .. } => StatusCode::NOT_FOUND,
            // Should not surface per-request; configuration is load-time.
            EcoError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

fn dataset_or_missing(
    state: &AppState,
    version: &str,
) -> Result<Arc<crate::dataset::Dataset>, EcoError> {
    state
        .datasets
        .get(version)
        .ok_or_else(|| EcoError::missing("reference dataset", version))
}

async fn compute_lca(
    State(state): State<AppState>,
    Json(req): Json<LcaRequest>,
) -> Result<Json<LcaResult>, EcoError> {
    let dataset = dataset_or_missing(&state, &req.dataset_version)?;
    let result = engine::compute_lca(&req, &dataset)?;
    counter!("eco_lca_computed_total").increment(1);
    Ok(Json(result))
}

#[derive(serde::Deserialize)]
struct ScoreRequest {
    lca: LcaResult,
    /// Optional pin: when present it must match the loaded calibration, so a
    /// caller replaying against a specific version fails loudly instead of
    /// silently scoring with a different one.
    #[serde(default)]
    weights_version: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
}

async fn compute_score(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<EcoScore>, EcoError> {
    if let Some(requested) = &req.weights_version {
        if requested != &state.scoring.version {
            return Err(EcoError::validation(format!(
                "weights_version '{requested}' does not match loaded calibration '{}'",
                state.scoring.version
            )));
        }
    }
    let dataset = dataset_or_missing(&state, &req.lca.dataset_version)?;
    let score = engine::compute_score(&req.lca, &dataset, &state.scoring, &req.labels);
    counter!("eco_scores_computed_total").increment(1);
    Ok(Json(score))
}

#[derive(serde::Deserialize)]
struct FullScoreRequest {
    #[serde(flatten)]
    lca: LcaRequest,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    input_artifact_ids: Vec<String>,
    /// Generated when absent, so retries with an explicit id stay idempotent.
    #[serde(default)]
    score_id: Option<String>,
}

#[derive(serde::Serialize)]
struct FullScoreResponse {
    score_id: String,
    lca: LcaResult,
    eco_score: EcoScore,
    provenance: ProvenanceRecord,
}

/// Convenience flow for the widget backends: ingredients → LCA → score →
/// provenance in one call.
async fn score_full(
    State(state): State<AppState>,
    Json(req): Json<FullScoreRequest>,
) -> Result<Json<FullScoreResponse>, EcoError> {
    let dataset = dataset_or_missing(&state, &req.lca.dataset_version)?;
    let (lca, eco_score) =
        engine::compute_product_score(&req.lca, &dataset, &state.scoring, &req.labels)?;

    let score_id = req
        .score_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut dataset_versions = std::collections::BTreeMap::new();
    dataset_versions.insert(
        crate::provenance::DATASET_IMPACT_FACTORS.to_string(),
        dataset.version.clone(),
    );

    let record = state.provenance.record(NewProvenance {
        score_id: score_id.clone(),
        input_artifact_ids: req.input_artifact_ids,
        dataset_versions,
        weights_version: state.scoring.version.clone(),
        computed_values: crate::provenance::ComputedValues {
            lca: lca.clone(),
            eco_score: eco_score.clone(),
        },
    });

    state.history.push(&score_id, &eco_score, &lca);
    counter!("eco_scores_computed_total").increment(1);

    Ok(Json(FullScoreResponse {
        score_id,
        lca,
        eco_score,
        provenance: (*record).clone(),
    }))
}

async fn record_provenance(
    State(state): State<AppState>,
    Json(new): Json<NewProvenance>,
) -> Result<Json<ProvenanceRecord>, EcoError> {
    if new.score_id.trim().is_empty() {
        return Err(EcoError::validation("score_id must not be empty"));
    }
    let record = state.provenance.record(new);
    Ok(Json((*record).clone()))
}

async fn get_lineage(
    State(state): State<AppState>,
    Path(score_id): Path<String>,
) -> Result<Json<ProvenanceRecord>, EcoError> {
    match state.provenance.lineage(&score_id) {
        Some(record) => Ok(Json((*record).clone())),
        None => Err(EcoError::missing(
            format!("provenance for score '{score_id}'"),
            "-",
        )),
    }
}

async fn get_descendants(
    State(state): State<AppState>,
    Path(artifact_id): Path<String>,
) -> Json<Vec<String>> {
    Json(state.provenance.descendants(&artifact_id))
}

async fn debug_factor(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<resolver::FactorInfo>, EcoError> {
    let ingredient = q.get("ingredient").cloned().unwrap_or_default();
    let version = q.get("version").cloned().unwrap_or_else(|| "v1".to_string());
    let dataset = dataset_or_missing(&state, &version)?;
    Ok(Json(resolver::factor_info(&dataset, &ingredient)))
}

async fn debug_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.snapshot_last_n(10))
}

async fn admin_reload_dataset(State(state): State<AppState>) -> String {
    let path =
        std::env::var(ENV_DATASET_PATH).unwrap_or_else(|_| DEFAULT_DATASET_PATH.to_string());
    match state.datasets.reload_from(&path) {
        Ok(n) => format!("reloaded {n} factors from {path}"),
        Err(e) => format!("failed: {e}"),
    }
}
