// tests/api_http.rs
//
// HTTP-level tests for the stateless endpoints, driven through
// tower::ServiceExt::oneshot against a cached Router.

use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use http::StatusCode;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tower::ServiceExt; // for `oneshot`

use eco_score_pipeline::app;

static ROUTER: OnceCell<axum::Router> = OnceCell::const_new();

async fn test_app() -> axum::Router {
    ROUTER
        .get_or_init(|| async { app().expect("app() should build a Router") })
        .await
        .clone()
}

async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
    let router = test_app().await;
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 256 * 1024).await.unwrap();
    let v: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, v)
}

async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
    let router = test_app().await;
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 256 * 1024).await.unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn lca_compute_returns_totals_and_breakdown() {
    let (status, v) = post_json(
        "/lca/compute",
        json!({
            "ingredients": [
                {"name": "wheat", "mass_fraction": 0.5},
                {"name": "sugar", "mass_fraction": 0.2}
            ],
            "dataset_version": "v1"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(v["water_l"].is_number());
    assert!(v["energy_mj"].is_number());
    assert_eq!(v["breakdown"].as_array().unwrap().len(), 2);
    assert_eq!(v["dataset_version"], json!("v1"));

    let expected_co2 = 0.5 * 0.8 + 0.2 * 0.6;
    assert!((v["co2_kg"].as_f64().unwrap() - expected_co2).abs() < 1e-9);
}

#[tokio::test]
async fn unknown_dataset_version_is_404() {
    let (status, v) = post_json(
        "/lca/compute",
        json!({
            "ingredients": [{"name": "wheat", "mass_fraction": 1.0}],
            "dataset_version": "v999"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(v["error"].as_str().unwrap().contains("v999"));
}

#[tokio::test]
async fn overweight_fractions_are_422() {
    let (status, v) = post_json(
        "/lca/compute",
        json!({
            "ingredients": [
                {"name": "wheat", "mass_fraction": 0.8},
                {"name": "sugar", "mass_fraction": 0.5}
            ],
            "dataset_version": "v1"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(v["error"].as_str().unwrap().contains("validation"));
}

#[tokio::test]
async fn unknown_ingredient_is_a_warning_not_an_error() {
    let (status, v) = post_json(
        "/lca/compute",
        json!({
            "ingredients": [
                {"name": "olive_oil", "mass_fraction": 0.5},
                {"name": "unknown_additive", "mass_fraction": 0.5}
            ],
            "dataset_version": "v1"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!((v["co2_kg"].as_f64().unwrap() - 0.5 * 3.5).abs() < 1e-9);
    assert_eq!(v["warnings"].as_array().unwrap().len(), 1);
    assert!(v["warnings"][0]
        .as_str()
        .unwrap()
        .contains("unknown_additive"));
    let missing = v["breakdown"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["label"] == json!("unknown_additive"))
        .expect("missing ingredient keeps a breakdown entry");
    assert_eq!(missing["quality"], json!("missing"));
}

#[tokio::test]
async fn score_compute_grades_an_lca_result() {
    let (status, lca) = post_json(
        "/lca/compute",
        json!({
            "ingredients": [{"name": "potato", "mass_fraction": 1.0}],
            "dataset_version": "v1"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, score) =
        post_json("/score/compute", json!({"lca": lca, "labels": ["organic"]})).await;
    assert_eq!(status, StatusCode::OK);
    let numeric = score["numeric"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&numeric));
    assert_eq!(score["letter"], json!("A"));
    assert_eq!(score["color"], json!("#1E8449"));
    let conf = score["confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&conf));
    assert_eq!(score["adjustments"][0]["label"], json!("organic"));
}

#[tokio::test]
async fn weights_version_pin_is_enforced() {
    let (_, lca) = post_json(
        "/lca/compute",
        json!({
            "ingredients": [{"name": "potato", "mass_fraction": 1.0}],
            "dataset_version": "v1"
        }),
    )
    .await;

    // Matching pin scores normally.
    let (status, _) = post_json(
        "/score/compute",
        json!({"lca": lca.clone(), "weights_version": "2024.1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Stale pin is rejected, not silently rescored.
    let (status, v) = post_json(
        "/score/compute",
        json!({"lca": lca, "weights_version": "1999.9"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(v["error"].as_str().unwrap().contains("1999.9"));
}

#[tokio::test]
async fn debug_factor_reports_known_and_unknown() {
    let (status, body) = get("/debug/factor?ingredient=olive_oil").await;
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["has_data"], json!(true));
    assert!((v["co2_per_kg"].as_f64().unwrap() - 3.5).abs() < 1e-9);

    let (status, body) = get("/debug/factor?ingredient=unobtainium").await;
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["has_data"], json!(false));
    assert!(v.get("co2_per_kg").is_none());
}
