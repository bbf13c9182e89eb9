// tests/provenance_concurrency.rs
//
// The recorder's idempotence guarantee under racing writers: N threads record
// the same score_id, exactly one record survives and everyone sees it.

use std::collections::BTreeMap;
use std::sync::Arc;

use eco_score_pipeline::config::ScoringConfig;
use eco_score_pipeline::dataset::Dataset;
use eco_score_pipeline::engine;
use eco_score_pipeline::model::{Ingredient, LcaRequest};
use eco_score_pipeline::provenance::{
    ComputedValues, NewProvenance, ProvenanceStore, DATASET_IMPACT_FACTORS,
};

fn new_provenance(score_id: &str) -> NewProvenance {
    let ds = Dataset::default_seed();
    let cfg = ScoringConfig::default_seed();
    let req = LcaRequest {
        ingredients: vec![Ingredient::new("wheat", 1.0)],
        transport: Vec::new(),
        packaging: Vec::new(),
        dataset_version: "v1".into(),
    };
    let (lca, eco_score) = engine::compute_product_score(&req, &ds, &cfg, &[]).unwrap();

    let mut dataset_versions = BTreeMap::new();
    dataset_versions.insert(DATASET_IMPACT_FACTORS.to_string(), ds.version.clone());

    NewProvenance {
        score_id: score_id.to_string(),
        input_artifact_ids: vec!["parse-1".into()],
        dataset_versions,
        weights_version: cfg.version.clone(),
        computed_values: ComputedValues { lca, eco_score },
    }
}

#[test]
fn racing_duplicate_writes_keep_exactly_one_record() {
    let store = Arc::new(ProvenanceStore::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || store.record(new_provenance("race-1")))
        })
        .collect();

    let records: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(store.len(), 1);
    let first = &records[0];
    for rec in &records {
        assert!(Arc::ptr_eq(first, rec));
    }

    // The edge list saw the score once, not eight times.
    assert_eq!(store.descendants("parse-1"), vec!["race-1"]);
}

#[test]
fn distinct_score_ids_record_independently() {
    let store = Arc::new(ProvenanceStore::new());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || store.record(new_provenance(&format!("score-{i}"))))
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.len(), 4);
    assert_eq!(
        store.descendants("parse-1"),
        vec!["score-0", "score-1", "score-2", "score-3"]
    );
}
