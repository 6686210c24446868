//! REST API routes for the web server
//!
//! Provides endpoints for background removal uploads, health checks, and
//! server statistics.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::pipeline::{ImageProcessor, PipelineError};

use super::metrics::{MetricsCollector, StatsResponse};

/// Filename assumed when the upload carries none
const FALLBACK_UPLOAD_NAME: &str = "upload";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<ImageProcessor>,
    pub metrics: Arc<MetricsCollector>,
    pub version: String,
}

impl AppState {
    pub fn new(processor: Arc<ImageProcessor>) -> Self {
        Self {
            processor,
            metrics: Arc::new(MetricsCollector::new()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Build the API router
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/remove-background", post(remove_background))
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: ModelStatus,
}

#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub backend: String,
    pub available: bool,
    pub path: Option<String>,
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let backend = state.processor.backend();
    let model = ModelStatus {
        backend: backend.name().to_string(),
        // The file can disappear underneath a running server
        available: backend.model_path().map(|p| p.is_file()).unwrap_or(true),
        path: backend.model_path().map(|p| p.display().to_string()),
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        model,
    })
}

/// Server statistics endpoint
async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(state.metrics.snapshot())
}

/// Successful removal response
#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub filename: String,
    pub url: String,
}

/// Upload an image and remove its background
async fn remove_background(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<RemoveResponse>, AppError> {
    state.metrics.record_request_started();
    let started = Instant::now();

    let mut filename = String::new();
    let mut file_data: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            filename = field
                .file_name()
                .unwrap_or(FALLBACK_UPLOAD_NAME)
                .to_string();
            if let Ok(data) = field.bytes().await {
                file_data = Some(data.to_vec());
            }
        }
    }

    let data = match file_data {
        Some(data) if !data.is_empty() => data,
        _ => {
            state.metrics.record_client_error();
            return Err(AppError::BadRequest("No file uploaded".to_string()));
        }
    };
    if filename.is_empty() {
        filename = FALLBACK_UPLOAD_NAME.to_string();
    }

    // The pipeline is CPU-bound; keep it off the async workers
    let processor = Arc::clone(&state.processor);
    let original = filename.clone();
    let outcome =
        tokio::task::spawn_blocking(move || processor.process(&data, &original)).await;

    let processed = match outcome {
        Ok(Ok(processed)) => processed,
        Ok(Err(e)) => {
            let err = AppError::from(e);
            match err {
                AppError::BadRequest(_) => state.metrics.record_client_error(),
                _ => state.metrics.record_server_error(),
            }
            tracing::warn!(filename = %filename, error = %err.message(), "processing failed");
            return Err(err);
        }
        Err(e) => {
            state.metrics.record_server_error();
            return Err(AppError::Internal(format!("Processing task failed: {}", e)));
        }
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    let output_bytes = std::fs::metadata(&processed.path)
        .map(|m| m.len())
        .unwrap_or(0);
    state.metrics.record_request_completed(elapsed_ms, output_bytes);

    tracing::info!(
        filename = %processed.filename,
        elapsed_ms,
        bytes = output_bytes,
        "background removed"
    );

    Ok(Json(RemoveResponse {
        filename: processed.filename,
        url: processed.url,
    }))
}

/// API error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl AppError {
    fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg) => msg,
            AppError::Internal(msg) => msg,
        }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        if err.is_client_error() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
