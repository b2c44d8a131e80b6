//! 数据模型
//!
//! - 告警记录：AlertRecord
//! - 写入输入：NewAlert（upsert 候选）、AlertUpdate（管理面更新）
//! - 查询输入输出：AlertFilter、PageRequest、AlertPage

use chrono::{DateTime, NaiveDate, Utc};
use domain::{AlertAnnotations, AlertLabels, AlertStatus};

/// 默认分页大小。
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// 单页上限。
pub const MAX_PAGE_SIZE: u64 = 1000;

/// 告警记录（唯一持久化实体）。
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRecord {
    pub alert_id: i64,
    pub status: AlertStatus,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub annotations: AlertAnnotations,
    pub labels: AlertLabels,
    pub fingerprint: String,
    /// 同指纹累计接收次数。
    pub alert_count: i64,
    /// `last_notify_date` 当天已预占的通知次数。
    pub daily_notify_count: i64,
    pub last_notify_date: Option<NaiveDate>,
    /// 有一次通知尚未确认送达。
    pub notify_pending: bool,
    pub is_deleted: bool,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

/// upsert 候选：首次写入时 alert_count=1、daily_notify_count=0、notify_pending=true。
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub status: AlertStatus,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub annotations: AlertAnnotations,
    pub labels: AlertLabels,
    pub fingerprint: String,
    pub received_at: DateTime<Utc>,
}

/// 告警更新输入（不修改指纹与通知计数）。
#[derive(Debug, Clone)]
pub struct AlertUpdate {
    pub status: AlertStatus,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub annotations: AlertAnnotations,
    pub labels: AlertLabels,
    pub updated_at: DateTime<Utc>,
}

/// 列表过滤条件。
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub status: Option<String>,
    /// 匹配 `labels.severity`。
    pub severity: Option<String>,
}

/// 偏移分页参数（页码从 1 开始）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// page_size 为 0 时取默认值，超过上限时截断；page 为 0 视为第一页。
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size.min(MAX_PAGE_SIZE)
            },
        }
    }

    /// 偏移量不超过 `i64::MAX`，可直接绑定到 SQL。
    pub fn offset(&self) -> u64 {
        self.page_size
            .saturating_mul(self.page.saturating_sub(1))
            .min(i64::MAX as u64)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// 分页结果。
#[derive(Debug, Clone)]
pub struct AlertPage {
    pub items: Vec<AlertRecord>,
    pub total: u64,
}
