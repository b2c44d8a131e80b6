//! 存储接口 Trait 定义
//!
//! AlertStore 是告警流水线唯一的持久化入口：
//! - 按指纹点查、按 ID 点查
//! - upsert（插入或冲突更新，唯一的去重同步点）
//! - 通知配额的条件更新（预占 / 确认 / 回滚）
//! - 管理面的更新、软删除、分页查询
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 条件写使用存储自身的原子语义，禁止“先读后写”
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::{AlertFilter, AlertPage, AlertRecord, AlertUpdate, NewAlert, PageRequest};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// 告警存储接口
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// 查找指纹对应的未删除记录
    async fn find_active(&self, fingerprint: &str) -> Result<Option<AlertRecord>, StorageError>;

    /// 按 ID 查找未删除记录
    async fn find_by_id(&self, alert_id: i64) -> Result<Option<AlertRecord>, StorageError>;

    /// 插入或冲突更新，返回合并后的记录
    ///
    /// 冲突时覆盖 status / 起止时间 / labels / annotations，
    /// alert_count + 1，刷新 update_time；通知相关字段保持不变。
    async fn upsert(&self, alert: NewAlert) -> Result<AlertRecord, StorageError>;

    /// 更新未删除记录（不修改指纹与通知计数）
    async fn update_alert(
        &self,
        alert_id: i64,
        update: AlertUpdate,
    ) -> Result<Option<AlertRecord>, StorageError>;

    /// 软删除，返回是否命中未删除记录
    async fn soft_delete(&self, alert_id: i64, now: DateTime<Utc>) -> Result<bool, StorageError>;

    /// 批量软删除，返回命中条数
    async fn soft_delete_batch(
        &self,
        alert_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<u64, StorageError>;

    /// 分页查询未删除记录（create_time 倒序）
    async fn list_alerts(
        &self,
        filter: &AlertFilter,
        page: PageRequest,
    ) -> Result<AlertPage, StorageError>;

    /// 原子预占一次当日通知配额
    ///
    /// 条件：同一天且未达上限，或从未通知，或跨天。
    /// 命中时 notify_pending=true，计数同日 +1、跨天重置为 1，
    /// last_notify_date=today。返回是否命中。
    async fn reserve_notification(
        &self,
        alert_id: i64,
        daily_limit: i64,
        today: NaiveDate,
    ) -> Result<bool, StorageError>;

    /// 只设置 notify_pending（不计数的通知）
    async fn mark_notify_pending(&self, alert_id: i64) -> Result<bool, StorageError>;

    /// 确认送达：清除 notify_pending，计数不变
    async fn confirm_notification(&self, alert_id: i64) -> Result<bool, StorageError>;

    /// 回滚一次预占：计数减一（不低于 0），notify_pending 不变
    async fn rollback_notification(&self, alert_id: i64) -> Result<bool, StorageError>;
}
