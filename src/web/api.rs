use crate::ingest::Ingestor;
use crate::record::parse_batch;
use crate::storage::latest_sample;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::SecondsFormat;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Shared state for the logger API
#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<Ingestor>,
}

const STATUS_OK: &str = "OK";

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
    /// Receipt time in fractional Unix seconds, as written into each record.
    pub time: f64,
}

#[derive(Debug, Serialize)]
pub struct LatestResponse {
    pub status: &'static str,
    #[serde(rename = "lastSample")]
    pub last_sample: String,
}

/// POST /mozillahubs
pub async fn ingest(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<IngestResponse>, ApiError> {
    let start = Instant::now();

    // Read and validate the request body
    let body = body.map_err(|e| {
        warn!(error = %e, "Could not read request body");
        ApiError::InvalidInput
    })?;

    let batch = parse_batch(&body).map_err(|e| {
        warn!(error = %e, "Could not decode body data");
        ApiError::InvalidInput
    })?;
    debug!(
        rows = batch.row_count(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Validated batch"
    );

    // Encode and append under the write lock
    let receipt = state.ingestor.ingest_blocking(batch).await.map_err(|e| {
        error!(error = %e, "Could not save data to file");
        ApiError::WriteFailed
    })?;

    info!(
        path = %receipt.path.display(),
        records = receipt.records,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Stored batch"
    );

    Ok(Json(IngestResponse {
        status: STATUS_OK,
        time: receipt.time.as_secs_f64(),
    }))
}

/// GET /latest
pub async fn latest(State(state): State<AppState>) -> Result<Json<LatestResponse>, ApiError> {
    // Directory listing blocks, keep it off the async workers
    let ingestor = Arc::clone(&state.ingestor);
    let result =
        tokio::task::spawn_blocking(move || latest_sample(ingestor.save_dir(), ingestor.naming()))
            .await;

    let modified = match result {
        Ok(Ok(modified)) => modified,
        Ok(Err(e)) => {
            warn!(error = %e, "Could not retrieve latest sample timestamp");
            return Err(ApiError::TimestampUnavailable);
        }
        Err(e) => {
            error!(error = %e, "Latest sample lookup task failed");
            return Err(ApiError::TimestampUnavailable);
        }
    };

    Ok(Json(LatestResponse {
        status: STATUS_OK,
        last_sample: modified.to_rfc3339_opts(SecondsFormat::Nanos, true),
    }))
}

/// GET /health
pub async fn health_check() -> Json<StatusResponse> {
    Json(StatusResponse { status: STATUS_OK })
}

/// Fallback for unsupported methods on the logger routes.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

// Error handling
#[derive(Debug)]
pub enum ApiError {
    InvalidInput,
    WriteFailed,
    TimestampUnavailable,
    MethodNotAllowed,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput => StatusCode::BAD_REQUEST,
            ApiError::WriteFailed | ApiError::TimestampUnavailable => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::InvalidInput => "Input data invalid",
            ApiError::WriteFailed => "Could not write to file",
            ApiError::TimestampUnavailable => "Could not retrieve timestamp",
            ApiError::MethodNotAllowed => "Method not allowed",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = StatusResponse {
            status: self.message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
