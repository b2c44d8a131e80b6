use alarm_alerting::{AlertError, AlertEvent};
use alarm_storage::{AlertRecord, StorageError};
use alarm_telemetry::MetricsSnapshot;
use api_contract::{AlertDto, AlertRequest, ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

pub fn bad_request_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message)),
    )
        .into_response()
}

pub fn not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", "not found")),
    )
        .into_response()
}

pub fn storage_error(err: StorageError) -> Response {
    error!(target: "alarm.api", error = %err, "storage_request_failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(
            "INTERNAL.ERROR",
            "internal server error",
        )),
    )
        .into_response()
}

/// 服务层错误到 HTTP 响应的统一映射。
pub fn alert_error(err: AlertError) -> Response {
    match err {
        AlertError::Validation(message) => bad_request_error(&message),
        AlertError::NotFound(_) => not_found_error(),
        AlertError::Storage(err) => storage_error(err),
    }
}

pub fn alert_event_from_request(req: AlertRequest) -> AlertEvent {
    AlertEvent {
        status: req.status,
        starts_at: req.starts_at,
        ends_at: req.ends_at,
        annotations: req.annotations,
        labels: req.labels,
    }
}

pub fn alert_to_dto(record: AlertRecord) -> AlertDto {
    AlertDto {
        alert_id: record.alert_id,
        status: record.status.to_string(),
        starts_at: record.starts_at.map(|value| value.to_rfc3339()),
        ends_at: record.ends_at.map(|value| value.to_rfc3339()),
        annotations: record.annotations,
        labels: record.labels,
        fingerprint: record.fingerprint,
        alert_count: record.alert_count,
        daily_notify_count: record.daily_notify_count,
        last_notify_date: record.last_notify_date.map(|date| date.to_string()),
        notify_pending: record.notify_pending,
        create_time: record.create_time.to_rfc3339(),
        update_time: record.update_time.to_rfc3339(),
    }
}

pub fn metrics_to_dto(snapshot: MetricsSnapshot) -> MetricsSnapshotDto {
    MetricsSnapshotDto {
        alerts_ingested: snapshot.alerts_ingested,
        ingest_failure: snapshot.ingest_failure,
        notify_reserved: snapshot.notify_reserved,
        notify_skipped: snapshot.notify_skipped,
        dispatch_success: snapshot.dispatch_success,
        dispatch_failure: snapshot.dispatch_failure,
        dispatch_rejected: snapshot.dispatch_rejected,
        compensation_failure: snapshot.compensation_failure,
        dispatch_latency_ms_total: snapshot.dispatch_latency_ms_total,
        dispatch_latency_ms_count: snapshot.dispatch_latency_ms_count,
    }
}
