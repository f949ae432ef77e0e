//! HTTP слой поверх фасада

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use health_risk_ml::api::{self, AppState};
use health_risk_ml::config::TrainingConfig;
use health_risk_ml::RiskService;

fn app() -> Router {
    let service = RiskService::new(TrainingConfig {
        samples: 120,
        epochs: 2,
        ..TrainingConfig::default()
    });
    api::router(AppState {
        service: Arc::new(service),
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()));
    (status, body)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_check() {
    let (status, body) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn assess_returns_risk_assessment() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/assess",
            serde_json::json!({
                "age": "45",
                "gender": "male",
                "bloodPressureSystolic": "120",
                "bloodPressureDiastolic": "80",
                "heartRate": "70",
                "cholesterol": "",
                "smokingStatus": "never"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let score = body["riskScore"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&score));
    assert!(["Low", "Medium", "High"].contains(&body["riskLevel"].as_str().unwrap()));
    assert!(["Likely", "Unlikely"].contains(&body["progressionLikelihood"].as_str().unwrap()));

    let (_, status_body) = send(&app, get("/api/model/status")).await;
    assert_eq!(status_body["state"], "Ready");
    assert_eq!(status_body["training_runs"], 1);
}

#[tokio::test]
async fn malformed_patient_is_rejected() {
    let app = app();
    let (status, body) = send(
        &app,
        post_json(
            "/api/assess",
            serde_json::json!({
                "age": "forty",
                "bloodPressureSystolic": "120",
                "bloodPressureDiastolic": "80",
                "heartRate": "70"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.as_str().unwrap().contains("age"));

    let (_, status_body) = send(&app, get("/api/model/status")).await;
    assert_eq!(status_body["state"], "Uninitialized");
}

#[tokio::test]
async fn dataset_metadata_and_synthetic_records() {
    let app = app();
    let (status, body) = send(&app, get("/api/datasets")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let request = Request::builder()
        .method("POST")
        .uri("/api/synthetic/patients?count=5")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);

    let request = Request::builder()
        .method("POST")
        .uri("/api/synthetic/unknown")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
