use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let body = json!({
        "service": env!("CARGO_PKG_NAME"),
        "status": "ok",
    });
    (StatusCode::OK, Json(body))
}
