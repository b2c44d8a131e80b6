//! 路由定义
//!
//! - 健康检查：/health
//! - 指标快照：/metrics
//! - 告警：/alerts（推送、列表、批量删除）、/alerts/:alert_id（详情、更新、删除）

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// 创建 API 路由
///
/// 返回包含所有 API 端点的 Router，由调用方挂载到 / 和 /api/ 两种前缀
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route(
            "/alerts",
            post(create_alert).get(list_alerts).delete(delete_alerts),
        )
        .route(
            "/alerts/:alert_id",
            get(get_alert).put(update_alert).delete(delete_alert),
        )
}
