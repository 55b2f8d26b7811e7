use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AxumAppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    pending_codes: usize,
}

/// Health check endpoint
///
/// The store is in-process, so the service is healthy whenever it can answer.
/// Reports how many codes are currently held (expired-but-unswept included).
pub async fn health_handler(
    Extension(state): Extension<AxumAppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let pending_codes = state.deps.otp.pending_count().await;

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            pending_codes,
        }),
    )
}
