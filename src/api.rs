/// HTTP API для фасада оценки риска

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::datasets::{self, DatasetMetadata, DATASET_METADATA};
use crate::error::RiskError;
use crate::service::{ModelStatus, RiskService};
use crate::types::{PatientInput, RiskAssessment};

const DEFAULT_SYNTHETIC_COUNT: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RiskService>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

pub fn router(state: AppState) -> Router {
    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/assess", post(assess))
        .route("/api/model/status", get(model_status))
        .route("/api/model/initialize", post(initialize_model))
        .route("/api/datasets", get(list_datasets))
        .route("/api/synthetic/:dataset", post(generate_synthetic))
        .layer(cors)
        .with_state(state)
}

/// Ошибки валидации → 422, всё остальное → 503 ("оценка недоступна")
fn error_response(e: RiskError) -> (StatusCode, String) {
    let status = if e.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, e.to_string())
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Health Risk ML API (Rust)",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn assess(
    State(state): State<AppState>,
    Json(input): Json<PatientInput>,
) -> ApiResult<RiskAssessment> {
    tracing::info!("Assess request (model state: {:?})", state.service.state());

    state
        .service
        .assess_patient(&input)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::warn!("Assessment unavailable: {}", e);
            error_response(e)
        })
}

async fn model_status(State(state): State<AppState>) -> Json<ModelStatus> {
    Json(state.service.status())
}

async fn initialize_model(State(state): State<AppState>) -> ApiResult<ModelStatus> {
    state
        .service
        .initialize()
        .await
        .map_err(error_response)?;
    Ok(Json(state.service.status()))
}

async fn list_datasets() -> Json<&'static [DatasetMetadata]> {
    Json(&DATASET_METADATA[..])
}

#[derive(Debug, Deserialize)]
struct SyntheticQuery {
    count: Option<usize>,
}

async fn generate_synthetic(
    Path(dataset): Path<String>,
    Query(query): Query<SyntheticQuery>,
) -> ApiResult<serde_json::Value> {
    let count = query.count.unwrap_or(DEFAULT_SYNTHETIC_COUNT);
    tracing::info!("Synthetic request: {} x {}", dataset, count);

    let mut rng = rand::thread_rng();
    datasets::generate_named(&dataset, count, &mut rng)
        .map(Json)
        .map_err(error_response)
}
