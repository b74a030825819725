//! HTTP handlers for the newsroom endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use newsroom_core::{NewsAssistant, NewsRequest, PipelineOrchestrator, PipelineResult};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::responses::{
    GenerateNewsRequest, GenerateNewsResponse, HealthResponse, QueryRequest, QueryResponse,
    SuggestionsRequest, SuggestionsResponse,
};

/// State shared across all handlers.
///
/// The orchestrator is immutable after construction; each request runs
/// with its own pipeline state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<PipelineOrchestrator>,
    pub assistant: NewsAssistant,
}

impl AppState {
    pub fn new(orchestrator: PipelineOrchestrator, assistant: NewsAssistant) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            assistant,
        }
    }
}

/// GET / and GET /agent/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// POST /generate-news - Run the full pipeline for one request
pub async fn generate_news(
    State(state): State<AppState>,
    payload: Result<Json<GenerateNewsRequest>, JsonRejection>,
) -> ApiResult<Json<GenerateNewsResponse>> {
    let Json(body) = payload?;
    let defaults = state.orchestrator.config();

    let request = NewsRequest::with_options(
        body.solicitud.unwrap_or_default(),
        Some(body.max_iterations.unwrap_or(defaults.default_max_iterations)),
        Some(
            body.quality_threshold
                .unwrap_or(defaults.default_quality_threshold),
        ),
    )
    .map_err(ApiError::invalid)?;

    info!(topic = %request.topic(), max_iterations = request.max_iterations(), "Generating news");
    let run = state.orchestrator.run(&request).await;

    if let PipelineResult::Failure { stage, error } = &run.result {
        warn!(run_id = %run.run_id, stage = ?stage, error = %error, "News generation failed");
    }

    GenerateNewsResponse::from_result(request.topic(), request.max_iterations(), run.result)
        .map(Json)
}

/// POST /agent/query - Answer a free-form question
pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<Json<QueryResponse>> {
    let Json(body) = payload?;
    let response = state
        .assistant
        .answer(&body.query)
        .await
        .map_err(|e| ApiError::from_core(e, "Error procesando la consulta"))?;

    Ok(Json(QueryResponse {
        status: "success".to_string(),
        query: body.query,
        response,
    }))
}

/// POST /agent/suggestions - Related topics for a query
pub async fn suggestions(
    State(state): State<AppState>,
    payload: Result<Json<SuggestionsRequest>, JsonRejection>,
) -> ApiResult<Json<SuggestionsResponse>> {
    let Json(body) = payload?;
    let suggestions = state
        .assistant
        .suggest(&body.query, &body.context)
        .await
        .map_err(|e| ApiError::from_core(e, "Error generando sugerencias"))?;

    Ok(Json(SuggestionsResponse {
        status: "success".to_string(),
        query: body.query,
        suggestions,
    }))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/agent/health", get(health))
        .route("/agent/query", post(query))
        .route("/agent/suggestions", post(suggestions))
        .route("/generate-news", post(generate_news))
}

/// Router with state, CORS and request tracing applied.
pub fn app(state: AppState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
