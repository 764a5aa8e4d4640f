/// HTTP API поверх очистки и генерации признаков

use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::error::PrepError;
use crate::pipeline::PreparationPipeline;
use crate::preprocessing::DataCleaner;
use crate::types::{
    CleaningReport, Dataset, DatasetRequest, DatasetResponse, FeatureReport, PreparationReport,
};

#[derive(Clone, Default)]
pub struct AppState {
    pipeline: Arc<PreparationPipeline>,
}

impl AppState {
    pub fn new(pipeline: PreparationPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Тело ответа с ошибкой
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl From<PrepError> for ApiError {
    fn from(err: PrepError) -> Self {
        let code = match err {
            PrepError::MissingColumn(_) => "MISSING_COLUMN",
            PrepError::NotNumeric(_) => "NOT_NUMERIC",
            PrepError::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            PrepError::LengthMismatch { .. } => "LENGTH_MISMATCH",
            PrepError::InvalidValue { .. } => "INVALID_VALUE",
            PrepError::InvalidParameter(_) => "INVALID_PARAMETER",
        };
        Self {
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(self)).into_response()
    }
}

pub fn router() -> Router {
    router_with_state(AppState::default())
}

pub fn router_with_state(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/clean", post(clean))
        .route("/api/features", post(build_features))
        .route("/api/prepare", post(prepare))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Housing Prep API (Rust)",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn clean(
    State(state): State<AppState>,
    Json(request): Json<DatasetRequest>,
) -> Result<Json<DatasetResponse<CleaningReport>>, ApiError> {
    tracing::info!("Clean request: {} rows", request.rows.len());

    let mut dataset = Dataset::from_records(&request.rows)?;
    let report = match request.config {
        Some(config) => DataCleaner::new(config)?.clean(&mut dataset)?,
        None => state.pipeline.cleaner().clean(&mut dataset)?,
    };

    Ok(Json(DatasetResponse {
        rows: dataset.to_records(),
        report,
    }))
}

async fn build_features(
    State(state): State<AppState>,
    Json(request): Json<DatasetRequest>,
) -> Result<Json<DatasetResponse<FeatureReport>>, ApiError> {
    tracing::info!("Feature request: {} rows", request.rows.len());

    let mut dataset = Dataset::from_records(&request.rows)?;
    let report = state.pipeline.engineer().build(&mut dataset);

    Ok(Json(DatasetResponse {
        rows: dataset.to_records(),
        report,
    }))
}

async fn prepare(
    State(state): State<AppState>,
    Json(request): Json<DatasetRequest>,
) -> Result<Json<DatasetResponse<PreparationReport>>, ApiError> {
    tracing::info!("Prepare request: {} rows", request.rows.len());

    let mut dataset = Dataset::from_records(&request.rows)?;
    let report = match request.config {
        Some(config) => PreparationPipeline::new(config)?.run(&mut dataset)?,
        None => state.pipeline.run(&mut dataset)?,
    };

    Ok(Json(DatasetResponse {
        rows: dataset.to_records(),
        report,
    }))
}
