pub mod analysis;
pub mod email_admin;
pub mod health;
pub mod notifications;
pub mod reports;
pub mod upload;

use axum::{http::StatusCode, response::Json};
use serde_json::json;

pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn validation_error(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"success": false, "message": message})),
    )
}

pub fn internal_error<E: std::fmt::Display>(message: &str, e: E) -> ApiError {
    tracing::error!("{}: {}", message, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"success": false, "message": message, "error": e.to_string()})),
    )
}

pub async fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Endpoint not found"})),
    )
}
