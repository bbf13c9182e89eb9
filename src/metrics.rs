use axum::{routing::get, Router};
use metrics::gauge;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Global Prometheus recorder plus the handle the exposition endpoint
/// renders from. Counters (`eco_lca_computed_total`,
/// `eco_scores_computed_total`) are emitted from the API handlers.
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the recorder and seed the dataset-version gauge. Must run
    /// before the first counter increment; a second install panics.
    pub fn init(dataset_versions: usize) -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        gauge!("eco_dataset_versions_loaded").set(dataset_versions as f64);

        Self { handle }
    }

    /// `/metrics`, Prometheus text exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
