//! 稳定的 DTO 与 API 响应契约。

use domain::{AlertAnnotations, AlertLabels};
use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 告警推送 / 更新请求体。
///
/// 字段缺失时取空值，由服务层统一校验（返回 400 而不是反序列化失败）。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertRequest {
    pub status: String,
    #[serde(alias = "starts_at")]
    pub starts_at: String,
    #[serde(alias = "ends_at")]
    pub ends_at: Option<String>,
    pub annotations: AlertAnnotations,
    pub labels: AlertLabels,
}

/// 批量删除请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAlertsRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
}

/// 删除结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted: u64,
}

/// 告警列表查询参数。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertListQuery {
    pub page_number: Option<u64>,
    pub page_size: Option<u64>,
    pub status: Option<String>,
    pub severity: Option<String>,
}

/// 告警返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDto {
    pub alert_id: i64,
    pub status: String,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub annotations: AlertAnnotations,
    pub labels: AlertLabels,
    pub fingerprint: String,
    pub alert_count: i64,
    pub daily_notify_count: i64,
    pub last_notify_date: Option<String>,
    pub notify_pending: bool,
    pub create_time: String,
    pub update_time: String,
}

/// 分页返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub list: Vec<T>,
    pub total_count: u64,
    pub curr_page: u64,
    pub page_size: u64,
}

/// 指标快照返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub alerts_ingested: u64,
    pub ingest_failure: u64,
    pub notify_reserved: u64,
    pub notify_skipped: u64,
    pub dispatch_success: u64,
    pub dispatch_failure: u64,
    pub dispatch_rejected: u64,
    pub compensation_failure: u64,
    pub dispatch_latency_ms_total: u64,
    pub dispatch_latency_ms_count: u64,
}
