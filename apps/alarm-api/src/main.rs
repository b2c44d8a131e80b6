//! 告警接收 HTTP API：告警推送、查询、更新、删除，以及健康检查与指标。

mod handlers;
mod middleware;
mod routes;
mod utils;

use alarm_alerting::{AlertService, AlertingConfig, DispatchConfig, QuotaPolicy};
use alarm_config::AppConfig;
use alarm_notify::{ChannelRoute, HttpNotifier, HttpNotifierConfig, DisabledNotifier, Notifier};
use alarm_storage::{AlertStore, InMemoryAlertStore, PgAlertStore, connect_pool, ensure_schema};
use alarm_telemetry::init_tracing;
use axum::Router;
use domain::SystemClock;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub alert_service: Arc<AlertService>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let store: Arc<dyn AlertStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = connect_pool(database_url, config.db_max_connections).await?;
            ensure_schema(&pool).await?;
            Arc::new(PgAlertStore::new(pool))
        }
        None => {
            warn!(target: "alarm.api", "ALARM_DATABASE_URL not set, alerts kept in memory");
            Arc::new(InMemoryAlertStore::new())
        }
    };

    let notifier: Arc<dyn Notifier> = match config.notify_url.clone() {
        Some(url) => Arc::new(HttpNotifier::new(HttpNotifierConfig {
            url,
            route: ChannelRoute {
                topic: config.notify_topic.clone(),
                tag: config.notify_tag.clone(),
                receiver: config.notify_receiver.clone(),
            },
            timeout: Duration::from_secs(config.notify_timeout_seconds),
        })?),
        None => {
            warn!(target: "alarm.api", "ALARM_NOTIFY_URL not set, notifications stay pending");
            Arc::new(DisabledNotifier)
        }
    };

    let alert_service = Arc::new(AlertService::new(
        store,
        notifier,
        Arc::new(SystemClock),
        AlertingConfig {
            quota: QuotaPolicy {
                daily_limit: config.daily_notify_limit,
                resolved_bypass: config.resolved_bypass_quota,
            },
            dispatch: DispatchConfig {
                workers: config.dispatch_workers,
                queue_capacity: config.dispatch_queue_capacity,
            },
        },
    ));
    let app = build_app(AppState { alert_service });

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(
        target: "alarm.api",
        addr = %config.http_addr,
        daily_notify_limit = config.daily_notify_limit,
        "alarm_api_listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

/// 组装路由：同一套接口挂在 / 与 /api 下。
fn build_app(state: AppState) -> Router {
    let api = routes::create_api_router();
    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .with_state(state)
        // 注入 request_id/trace_id
        .layer(axum::middleware::from_fn(middleware::request_context))
        .layer(TraceLayer::new_for_http())
}
