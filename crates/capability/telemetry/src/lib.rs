//! 追踪、请求 ID 与告警流水线计数指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
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

/// 进程内计数指标。
pub struct TelemetryMetrics {
    alerts_ingested: AtomicU64,
    ingest_failure: AtomicU64,
    notify_reserved: AtomicU64,
    notify_skipped: AtomicU64,
    dispatch_success: AtomicU64,
    dispatch_failure: AtomicU64,
    dispatch_rejected: AtomicU64,
    compensation_failure: AtomicU64,
    dispatch_latency_ms_total: AtomicU64,
    dispatch_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            alerts_ingested: AtomicU64::new(0),
            ingest_failure: AtomicU64::new(0),
            notify_reserved: AtomicU64::new(0),
            notify_skipped: AtomicU64::new(0),
            dispatch_success: AtomicU64::new(0),
            dispatch_failure: AtomicU64::new(0),
            dispatch_rejected: AtomicU64::new(0),
            compensation_failure: AtomicU64::new(0),
            dispatch_latency_ms_total: AtomicU64::new(0),
            dispatch_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            alerts_ingested: self.alerts_ingested.load(Ordering::Relaxed),
            ingest_failure: self.ingest_failure.load(Ordering::Relaxed),
            notify_reserved: self.notify_reserved.load(Ordering::Relaxed),
            notify_skipped: self.notify_skipped.load(Ordering::Relaxed),
            dispatch_success: self.dispatch_success.load(Ordering::Relaxed),
            dispatch_failure: self.dispatch_failure.load(Ordering::Relaxed),
            dispatch_rejected: self.dispatch_rejected.load(Ordering::Relaxed),
            compensation_failure: self.compensation_failure.load(Ordering::Relaxed),
            dispatch_latency_ms_total: self.dispatch_latency_ms_total.load(Ordering::Relaxed),
            dispatch_latency_ms_count: self.dispatch_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info，`RUST_LOG` 覆盖）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录告警接收次数（upsert 成功）。
pub fn record_alert_ingested() {
    metrics().alerts_ingested.fetch_add(1, Ordering::Relaxed);
}

/// 记录告警接收失败次数（校验或存储失败）。
pub fn record_ingest_failure() {
    metrics().ingest_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录通知配额预占成功次数。
pub fn record_notify_reserved() {
    metrics().notify_reserved.fetch_add(1, Ordering::Relaxed);
}

/// 记录因配额耗尽或预占失败而跳过的通知次数。
pub fn record_notify_skipped() {
    metrics().notify_skipped.fetch_add(1, Ordering::Relaxed);
}

pub fn record_dispatch_success() {
    metrics().dispatch_success.fetch_add(1, Ordering::Relaxed);
}

pub fn record_dispatch_failure() {
    metrics().dispatch_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录派发队列拒绝次数（队列满或已关闭）。
pub fn record_dispatch_rejected() {
    metrics().dispatch_rejected.fetch_add(1, Ordering::Relaxed);
}

/// 记录确认/回滚失败次数。
pub fn record_compensation_failure() {
    metrics()
        .compensation_failure
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录单次通知投递耗时（毫秒）。
pub fn record_dispatch_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .dispatch_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .dispatch_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}
