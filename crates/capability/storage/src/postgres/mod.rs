//! # PostgreSQL 存储实现模块
//!
//! 生产环境使用的告警存储。
//!
//! ## 数据库模式要求
//!
//! 依赖 `prometheus_alerts` 表（见 `migrations/0001_prometheus_alerts.sql`，
//! 启动时由 [`crate::ensure_schema`] 执行）：
//!
//! - `labels` / `annotations` 为 jsonb，列表按 `labels->>'severity'` 过滤
//! - `last_notify_date` 为 date，配额按自然日比较
//! - `uk_prometheus_alerts_fingerprint_active`：`(fingerprint) where is_deleted = false`
//!   部分唯一索引，是 upsert 的冲突目标
//!
//! ## 并发语义
//!
//! - upsert 使用 `insert ... on conflict do update`，并发写入同一指纹只产生一条记录，
//!   `alert_count` 精确累加
//! - 配额预占是一条带条件的 `update`，以 `rows_affected` 判断是否成功，
//!   不存在“先读后写”的竞态窗口
//! - 回滚使用 `greatest(daily_notify_count - 1, 0)`，计数不会为负

pub mod alert;

pub use alert::*;
