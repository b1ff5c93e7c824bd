//! Liveness endpoint.

use axum::Json;

use crate::models::Health;

/// `GET /v1/health`: liveness probe, no database dependency.
pub async fn health() -> Json<Health> {
    Json(Health {
        message: "ok".to_string(),
    })
}
