use crate::AppState;
use crate::utils::{alert_error, alert_event_from_request, alert_to_dto};
use alarm_storage::{AlertFilter, PageRequest};
use api_contract::{
    AlertListQuery, AlertRequest, ApiResponse, DeleteAlertsRequest, DeleteResult, PageResult,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(serde::Deserialize)]
pub struct AlertPath {
    pub alert_id: i64,
}

/// 告警推送入口：立即返回合并后的记录，通知在后台派发。
pub async fn create_alert(
    State(state): State<AppState>,
    Json(payload): Json<AlertRequest>,
) -> Response {
    match state
        .alert_service
        .ingest(alert_event_from_request(payload))
        .await
    {
        Ok(record) => (
            StatusCode::OK,
            Json(ApiResponse::success(alert_to_dto(record))),
        )
            .into_response(),
        Err(err) => alert_error(err),
    }
}

pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertListQuery>,
) -> Response {
    let page = PageRequest::new(
        query.page_number.unwrap_or(1),
        query.page_size.unwrap_or(0),
    );
    let filter = AlertFilter {
        status: query.status,
        severity: query.severity,
    };
    match state.alert_service.list_alerts(filter, page).await {
        Ok(result) => {
            let data = PageResult {
                list: result.items.into_iter().map(alert_to_dto).collect(),
                total_count: result.total,
                curr_page: page.page,
                page_size: page.page_size,
            };
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => alert_error(err),
    }
}

pub async fn get_alert(State(state): State<AppState>, Path(path): Path<AlertPath>) -> Response {
    match state.alert_service.get_alert(path.alert_id).await {
        Ok(record) => (
            StatusCode::OK,
            Json(ApiResponse::success(alert_to_dto(record))),
        )
            .into_response(),
        Err(err) => alert_error(err),
    }
}

pub async fn update_alert(
    State(state): State<AppState>,
    Path(path): Path<AlertPath>,
    Json(payload): Json<AlertRequest>,
) -> Response {
    match state
        .alert_service
        .update_alert(path.alert_id, alert_event_from_request(payload))
        .await
    {
        Ok(record) => (
            StatusCode::OK,
            Json(ApiResponse::success(alert_to_dto(record))),
        )
            .into_response(),
        Err(err) => alert_error(err),
    }
}

pub async fn delete_alert(State(state): State<AppState>, Path(path): Path<AlertPath>) -> Response {
    match state.alert_service.delete_alert(path.alert_id).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success(true))).into_response(),
        Err(err) => alert_error(err),
    }
}

pub async fn delete_alerts(
    State(state): State<AppState>,
    Json(payload): Json<DeleteAlertsRequest>,
) -> Response {
    match state.alert_service.delete_alerts(&payload.ids).await {
        Ok(deleted) => (
            StatusCode::OK,
            Json(ApiResponse::success(DeleteResult { deleted })),
        )
            .into_response(),
        Err(err) => alert_error(err),
    }
}
