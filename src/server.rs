//! HTTP surface: the axum router, handlers and error mapping.

use crate::api::{
    AnalyzeFileResponse, AnalyzeRepositoryRequest, AnalyzeRepositoryResponse, ErrorResponse, HealthResponse,
    InsightService,
};
use crate::config::Config;
use crate::error::{InsightError, Result};
use crate::extractors::UploadedDocument;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Service behind every analysis route
    pub service: Arc<InsightService>,
}

impl AppState {
    /// Wraps the service for sharing across handlers
    pub fn new(service: InsightService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Error wrapper that renders as `{ "error": message }`
#[derive(Debug)]
pub struct AppError(pub InsightError);

impl From<InsightError> for AppError {
    fn from(e: InsightError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Rejected request: {}", self.0);
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the router with all routes and middleware
pub fn create_app(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/analyze", post(analyze_repository))
        .route("/api/analyze-file", post(analyze_file))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Json<Value> {
    Json(json!({
        "service": "llamainsight",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "AI summaries of GitHub repositories and uploaded documents",
        "endpoints": {
            "health": "GET /health",
            "analyzeRepository": "POST /api/analyze",
            "analyzeFile": "POST /api/analyze-file"
        }
    }))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

async fn analyze_repository(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AnalyzeRepositoryRequest>, JsonRejection>,
) -> std::result::Result<Json<AnalyzeRepositoryResponse>, AppError> {
    let Json(request) =
        payload.map_err(|e| InsightError::validation(format!("Invalid request body: {}", e.body_text())))?;
    info!("Repository analysis requested for {}", request.url);
    let response = state.service.analyze_repository(&request.url).await?;
    Ok(Json(response))
}

async fn analyze_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> std::result::Result<Json<AnalyzeFileResponse>, AppError> {
    let document = read_upload(multipart).await?;
    info!(
        "File analysis requested for {} ({}, {} bytes)",
        document.filename,
        document.content_type,
        document.bytes.len()
    );
    let response = state.service.analyze_file(&document).await?;
    Ok(Json(response))
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadedDocument> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| InsightError::validation(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| InsightError::validation(format!("Failed to read upload: {}", e)))?;
        return Ok(UploadedDocument::new(bytes, content_type, filename));
    }
    Err(InsightError::validation("No file provided"))
}

/// Binds the configured address and serves until the process exits
pub async fn run_server(config: Config) -> Result<()> {
    config.validate()?;
    if config.api_keys.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; analysis requests will fail until it is configured");
    }

    let bind = config.server.bind.clone();
    let max_upload = config.server.max_upload_bytes;
    let state = AppState::new(InsightService::new(config)?);
    let app = create_app(state, max_upload);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Server listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app).await?;
    Ok(())
}
