use crate::models::responses::HealthResponse;
use axum::response::Json;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "gateway-service".to_string(),
        status: "running".to_string(),
    })
}

pub async fn liveness() -> &'static str {
    "ok"
}
