//! # Provenance Recorder
//!
//! Immutable lineage records tying a score to the exact inputs, dataset
//! versions, and weight configuration that produced it.
//!
//! - `record` is idempotent by `score_id`: the first write wins, a duplicate
//!   returns the existing record unchanged. The guard is a short write-lock
//!   over an insert-if-absent, never held across a computation.
//! - Lineage edges (`artifact → score`) are append-only; dataset and weights
//!   versions are edge keys too (`"impact_factors@v1"`, `"weights@2024.1"`),
//!   which is what makes "what would change if this dataset is updated"
//!   queries possible via `descendants`.
//! - Every record carries a SHA-256 hash over its canonical JSON payload so
//!   downstream consumers can verify integrity. `BTreeMap` keeps the version
//!   map serialization byte-stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use tracing::info;

use crate::model::{EcoScore, LcaResult};

/// Key under which the impact-factor dataset version is recorded in
/// `dataset_versions` and in the edge list.
pub const DATASET_IMPACT_FACTORS: &str = "impact_factors";
/// Edge-list prefix for the weights configuration version.
pub const WEIGHTS_ARTIFACT: &str = "weights";

/// Snapshot of the computed values, persisted inside the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedValues {
    pub lca: LcaResult,
    pub eco_score: EcoScore,
}

/// The durable audit artifact. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub score_id: String,
    pub created_at: DateTime<Utc>,
    /// Upstream artifact ids (parse id, extraction id, ...).
    pub input_artifact_ids: Vec<String>,
    /// Dataset name → version, e.g. {"impact_factors": "v1"}.
    pub dataset_versions: BTreeMap<String, String>,
    pub weights_version: String,
    pub computed_values: ComputedValues,
    /// SHA-256 over the canonical payload (everything above but `created_at`).
    pub data_hash: String,
}

/// Everything needed to create a record; `created_at` and `data_hash` are
/// filled in by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProvenance {
    pub score_id: String,
    pub input_artifact_ids: Vec<String>,
    pub dataset_versions: BTreeMap<String, String>,
    pub weights_version: String,
    pub computed_values: ComputedValues,
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<String, Arc<ProvenanceRecord>>,
    /// artifact id (or "name@version") → score ids derived from it.
    edges: HashMap<String, Vec<String>>,
}

/// In-memory append-only store. The write path is the only shared-mutation
/// point of the pipeline; see module docs for the idempotence guarantee.
#[derive(Debug, Default)]
pub struct ProvenanceStore {
    inner: RwLock<Inner>,
}

impl ProvenanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create exactly one record per `score_id`. A second call with the same
    /// id is a no-op returning the existing record.
    pub fn record(&self, new: NewProvenance) -> Arc<ProvenanceRecord> {
        let mut guard = self.inner.write().expect("provenance lock poisoned");

        if let Some(existing) = guard.records.get(&new.score_id) {
            // Conflict resolved silently; first write wins.
            return existing.clone();
        }

        let data_hash = payload_hash(&new);
        let record = Arc::new(ProvenanceRecord {
            score_id: new.score_id.clone(),
            created_at: Utc::now(),
            input_artifact_ids: new.input_artifact_ids.clone(),
            dataset_versions: new.dataset_versions.clone(),
            weights_version: new.weights_version.clone(),
            computed_values: new.computed_values,
            data_hash,
        });

        for artifact in edge_keys(&record) {
            guard
                .edges
                .entry(artifact)
                .or_default()
                .push(record.score_id.clone());
        }
        guard.records.insert(new.score_id.clone(), record.clone());
        info!(score_id = %new.score_id, "provenance record created");
        record
    }

    /// Ancestor view: the record itself carries the full input chain.
    pub fn lineage(&self, score_id: &str) -> Option<Arc<ProvenanceRecord>> {
        self.inner
            .read()
            .expect("provenance lock poisoned")
            .records
            .get(score_id)
            .cloned()
    }

    /// All score ids derived from an input artifact or a `name@version` key.
    pub fn descendants(&self, artifact_id: &str) -> Vec<String> {
        let guard = self.inner.read().expect("provenance lock poisoned");
        let mut out = guard.edges.get(artifact_id).cloned().unwrap_or_default();
        out.sort();
        out.dedup();
        out
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .expect("provenance lock poisoned")
            .records
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Edge keys for one record: raw input artifact ids plus versioned
/// dataset/weights keys.
fn edge_keys(record: &ProvenanceRecord) -> Vec<String> {
    let mut keys: Vec<String> = record.input_artifact_ids.clone();
    for (name, version) in &record.dataset_versions {
        keys.push(format!("{name}@{version}"));
    }
    keys.push(format!("{WEIGHTS_ARTIFACT}@{}", record.weights_version));
    keys.sort();
    keys.dedup();
    keys
}

/// SHA-256 hex over the canonical JSON payload. `dataset_versions` is a
/// `BTreeMap`, so the serialization (and therefore the hash) is stable.
fn payload_hash(new: &NewProvenance) -> String {
    let serialized = serde_json::to_vec(new).expect("provenance payload serializes");
    let digest = Sha256::digest(&serialized);
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}
