use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::FdError;
use crate::executor::FemDesignApplication;
use crate::models::{ListingPlan, ReadStatus, ResultsResponse, ScriptResponse, ValidateResponse};
use crate::pipeline::{self, ReadResultsRequest};

/// Application state
pub struct AppState {
    config: EngineConfig,
    engine: Arc<FemDesignApplication>,
}

impl AppState {
    pub fn new(config: EngineConfig) -> Self {
        let engine = Arc::new(FemDesignApplication::from_config(&config));
        Self { config, engine }
    }
}

/// Build the API router
pub fn create_router(config: EngineConfig) -> Router {
    let state = AppState::new(config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/api/v1/version", get(version_handler))
        .route("/api/v1/validate", post(validate_handler))
        .route("/api/v1/script", post(script_handler))
        .route("/api/v1/results", post(results_handler))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Root endpoint
async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({
        "service": "fdscript service",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "description": "Script generation and result reading for the FEM-Design engine",
        "result_categories": crate::results::ResultCategory::ALL
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>(),
    }))
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let engine_path = state.engine.engine_path();

    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "engine_available": engine_path.exists(),
        "engine_command": engine_path,
        "debug_export": state.config.debug_export,
    }))
}

/// Version endpoint
async fn version_handler() -> Json<serde_json::Value> {
    Json(json!({
        "service": "fdscript service",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "fd_version": crate::script::FD_VERSION,
    }))
}

/// Resolve categories into listings without writing anything
async fn validate_handler(
    Json(request): Json<ReadResultsRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    tracing::info!("Validating read of {} categories", request.results.len());
    let prepared = pipeline::prepare(&request)?;

    Ok(Json(ValidateResponse {
        valid: true,
        finite_element: prepared.request.finite_element,
        listings: prepared.bscs.iter().map(ListingPlan::from).collect(),
    }))
}

/// Return the script a read would run
async fn script_handler(
    Json(request): Json<ReadResultsRequest>,
) -> Result<Json<ScriptResponse>, ApiError> {
    let prepared = pipeline::prepare(&request)?;
    let script = prepared.script.to_xml_string()?;
    tracing::info!("Generated script with {} commands", prepared.script.commands().len());

    Ok(Json(ScriptResponse {
        job_id: Uuid::new_v4().to_string(),
        script_path: prepared.script_path,
        script,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// Run a read against the engine
async fn results_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReadResultsRequest>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let job_id = Uuid::new_v4().to_string();
    tracing::info!("Read {} requested for {:?}", job_id, request.model_path);
    tracing::info!("  Results: {:?}", request.results);
    tracing::info!("  Cases: {:?}, Combinations: {:?}", request.cases, request.combinations);

    let engine = Arc::clone(&state.engine);
    let outcome = tokio::task::spawn_blocking(move || pipeline::read_results(&request, &*engine))
        .await
        .map_err(|e| ApiError::InternalError(format!("Read task failed: {}", e)))?;

    let response = match outcome {
        Ok(results) => {
            let status = if results.errors.is_empty() {
                ReadStatus::Success
            } else {
                ReadStatus::Partial
            };
            ResultsResponse {
                job_id,
                status,
                results: Some(results),
                error_message: None,
                timestamp: chrono::Utc::now().to_rfc3339(),
            }
        }
        Err(err @ FdError::Engine(_)) => {
            tracing::error!("Read {} failed: {}", job_id, err);
            ResultsResponse {
                job_id,
                status: ReadStatus::Failed,
                results: None,
                error_message: Some(err.to_string()),
                timestamp: chrono::Utc::now().to_rfc3339(),
            }
        }
        Err(err) => return Err(err.into()),
    };

    Ok(Json(response))
}

/// API Errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<FdError> for ApiError {
    fn from(err: FdError) -> Self {
        match err {
            FdError::UnknownCategory(_)
            | FdError::MalformedMapping(_)
            | FdError::SchemaViolation(_)
            | FdError::PathResolution { .. } => ApiError::ValidationError(err.to_string()),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_category_is_a_bad_request() {
        let response = ApiError::from(FdError::UnknownCategory("Bogus".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::from(FdError::Engine("crashed".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_validate_lists_planned_files() {
        let request = ReadResultsRequest::new(
            "/work/model.struxml",
            vec!["FiniteElement".to_string()],
        );
        let Json(response) = validate_handler(Json(request)).await.unwrap();
        assert!(response.finite_element);
        assert_eq!(response.listings.len(), 3);
        assert!(response.listings[0].bsc_file.ends_with("scripts/FemNode.bsc"));
    }
}
