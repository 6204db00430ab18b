use axum::{Json, Router, http::StatusCode, response::Response, routing::get};
use serde_json::{Value, json};

use crate::app::errors::json_error;

pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "not found")
}

pub async fn method_not_allowed() -> Response {
    json_error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}
