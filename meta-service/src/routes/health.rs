use crate::models::responses::{HealthResponse, LivenessResponse};
use axum::response::Json;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "meta-service".to_string(),
        status: "running".to_string(),
    })
}

pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { ok: true })
}
