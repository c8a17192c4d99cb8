//! API route handlers
//!
//! - `pdf`: the three upload endpoints
//! - `health`: liveness, readiness, and metrics

pub mod health;
pub mod pdf;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Service name and available endpoints (`GET /`).
///
/// ```json
/// {
///   "name": "PDF Intake Server",
///   "version": "0.1.0",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "PDF Intake Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/pdf/upload",
            "/pdf/upload-base64",
            "/pdf/upload-any-json",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
