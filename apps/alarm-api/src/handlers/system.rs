use crate::utils::metrics_to_dto;
use alarm_telemetry::metrics;
use api_contract::ApiResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

/// 进程内计数器快照。
pub async fn get_metrics() -> Response {
    let snapshot = metrics_to_dto(metrics().snapshot());
    (StatusCode::OK, Json(ApiResponse::success(snapshot))).into_response()
}
