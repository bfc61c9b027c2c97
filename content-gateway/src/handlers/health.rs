use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe for Docker/K8s.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "content-gateway",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness probe. The upstream endpoints belong to the caller's deployment
/// and are not probed from here.
pub async fn readiness_check() -> StatusCode {
    StatusCode::OK
}
