//! history.rs — simple in-memory log of recent score computations for the
//! debug endpoints. Bounded, lossy, diagnostic only; the durable audit trail
//! lives in `provenance`.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::model::{EcoScore, LcaResult};

#[derive(Debug, Clone, serde::Serialize)]
pub struct HistoryEntry {
    pub ts_unix: u64,
    pub score_id: String,
    pub numeric: f64,
    pub letter: String,
    pub confidence: f32,
    pub dataset_version: String,
    pub warnings: usize,
}

#[derive(Debug)]
pub struct History {
    inner: Mutex<Vec<HistoryEntry>>,
    cap: usize,
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(Vec::with_capacity(cap.min(10_000))),
            cap: cap.min(10_000),
        }
    }

    pub fn push(&self, score_id: &str, score: &EcoScore, lca: &LcaResult) {
        let entry = HistoryEntry {
            ts_unix: now_unix(),
            score_id: score_id.to_string(),
            numeric: score.numeric,
            letter: score.letter.as_str().to_string(),
            confidence: score.confidence,
            dataset_version: lca.dataset_version.clone(),
            warnings: lca.warnings.len(),
        };

        let mut v = self.inner.lock().expect("history mutex poisoned");
        v.push(entry);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let v = self.inner.lock().expect("history mutex poisoned");
        let len = v.len();
        let start = len.saturating_sub(n);
        v[start..].to_vec()
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::dataset::Dataset;
    use crate::engine;
    use crate::model::{Ingredient, LcaRequest};

    #[test]
    fn capped_and_last_n_in_order() {
        let ds = Dataset::default_seed();
        let cfg = ScoringConfig::default_seed();
        let req = LcaRequest {
            ingredients: vec![Ingredient::new("wheat", 1.0)],
            transport: Vec::new(),
            packaging: Vec::new(),
            dataset_version: "v1".into(),
        };
        let (lca, score) = engine::compute_product_score(&req, &ds, &cfg, &[]).unwrap();

        let h = History::with_capacity(3);
        for i in 0..5 {
            h.push(&format!("score-{i}"), &score, &lca);
        }
        let rows = h.snapshot_last_n(10);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].score_id, "score-2");
        assert_eq!(rows[2].score_id, "score-4");
    }
}
