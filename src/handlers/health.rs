// src/handlers/health.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{error::AppError, store::DynStore};

#[utoipa::path(
    get,
    path = "/api/health/liveness",
    tag = "System",
    responses((status = 200, description = "Process is up", body = String))
)]
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Ready once the store answers a round trip.
#[utoipa::path(
    get,
    path = "/api/health/readiness",
    tag = "System",
    responses(
        (status = 200, description = "Store reachable", body = String),
        (status = 500, description = "Store unreachable")
    )
)]
pub async fn readiness(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    store.ping().await.map_err(|e| {
        tracing::error!("Readiness check failed: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::OK, "OK"))
}
