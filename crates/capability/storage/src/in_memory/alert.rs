//! 告警存储内存实现
//!
//! 单把写锁覆盖每次调用，upsert 与条件更新在锁内完成，
//! 语义与 PostgreSQL 实现一致。用于测试与无数据库的本地运行。

use crate::error::StorageError;
use crate::models::{AlertFilter, AlertPage, AlertRecord, AlertUpdate, NewAlert, PageRequest};
use crate::traits::AlertStore;
use crate::validation::{ensure_alert_id, ensure_fingerprint};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::RwLock;

struct AlertTable {
    next_id: i64,
    rows: Vec<AlertRecord>,
}

/// 告警内存存储
pub struct InMemoryAlertStore {
    table: RwLock<AlertTable>,
}

impl InMemoryAlertStore {
    /// 创建新的告警存储
    pub fn new() -> Self {
        Self {
            table: RwLock::new(AlertTable {
                next_id: 1,
                rows: Vec::new(),
            }),
        }
    }

    fn update_row<F>(&self, alert_id: i64, apply: F) -> Result<bool, StorageError>
    where
        F: FnOnce(&mut AlertRecord) -> bool,
    {
        ensure_alert_id(alert_id)?;
        let mut table = self
            .table
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        match table.rows.iter_mut().find(|row| row.alert_id == alert_id) {
            Some(row) => Ok(apply(row)),
            None => Ok(false),
        }
    }
}

impl Default for InMemoryAlertStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AlertStore for InMemoryAlertStore {
    async fn find_active(&self, fingerprint: &str) -> Result<Option<AlertRecord>, StorageError> {
        ensure_fingerprint(fingerprint)?;
        let table = self
            .table
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(table
            .rows
            .iter()
            .find(|row| !row.is_deleted && row.fingerprint == fingerprint)
            .cloned())
    }

    async fn find_by_id(&self, alert_id: i64) -> Result<Option<AlertRecord>, StorageError> {
        ensure_alert_id(alert_id)?;
        let table = self
            .table
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(table
            .rows
            .iter()
            .find(|row| !row.is_deleted && row.alert_id == alert_id)
            .cloned())
    }

    async fn upsert(&self, alert: NewAlert) -> Result<AlertRecord, StorageError> {
        ensure_fingerprint(&alert.fingerprint)?;
        let mut table = self
            .table
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if let Some(row) = table
            .rows
            .iter_mut()
            .find(|row| !row.is_deleted && row.fingerprint == alert.fingerprint)
        {
            row.status = alert.status;
            row.starts_at = alert.starts_at;
            row.ends_at = alert.ends_at;
            row.annotations = alert.annotations;
            row.labels = alert.labels;
            row.alert_count += 1;
            row.update_time = alert.received_at;
            return Ok(row.clone());
        }

        let alert_id = table.next_id;
        table.next_id += 1;
        let record = AlertRecord {
            alert_id,
            status: alert.status,
            starts_at: alert.starts_at,
            ends_at: alert.ends_at,
            annotations: alert.annotations,
            labels: alert.labels,
            fingerprint: alert.fingerprint,
            alert_count: 1,
            daily_notify_count: 0,
            last_notify_date: None,
            notify_pending: true,
            is_deleted: false,
            create_time: alert.received_at,
            update_time: alert.received_at,
        };
        table.rows.push(record.clone());
        Ok(record)
    }

    async fn update_alert(
        &self,
        alert_id: i64,
        update: AlertUpdate,
    ) -> Result<Option<AlertRecord>, StorageError> {
        ensure_alert_id(alert_id)?;
        let mut table = self
            .table
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(row) = table
            .rows
            .iter_mut()
            .find(|row| !row.is_deleted && row.alert_id == alert_id)
        else {
            return Ok(None);
        };
        row.status = update.status;
        row.starts_at = update.starts_at;
        row.ends_at = update.ends_at;
        row.annotations = update.annotations;
        row.labels = update.labels;
        row.update_time = update.updated_at;
        Ok(Some(row.clone()))
    }

    async fn soft_delete(&self, alert_id: i64, now: DateTime<Utc>) -> Result<bool, StorageError> {
        self.update_row(alert_id, |row| {
            if row.is_deleted {
                return false;
            }
            row.is_deleted = true;
            row.update_time = now;
            true
        })
    }

    async fn soft_delete_batch(
        &self,
        alert_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut affected = 0;
        for row in table
            .rows
            .iter_mut()
            .filter(|row| !row.is_deleted && alert_ids.contains(&row.alert_id))
        {
            row.is_deleted = true;
            row.update_time = now;
            affected += 1;
        }
        Ok(affected)
    }

    async fn list_alerts(
        &self,
        filter: &AlertFilter,
        page: PageRequest,
    ) -> Result<AlertPage, StorageError> {
        let table = self
            .table
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<AlertRecord> = table
            .rows
            .iter()
            .filter(|row| !row.is_deleted)
            .filter(|row| match filter.status.as_deref() {
                Some(status) => row.status.as_str() == status,
                None => true,
            })
            .filter(|row| match filter.severity.as_deref() {
                Some(severity) => row.labels.severity == severity,
                None => true,
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.create_time
                .cmp(&a.create_time)
                .then(b.alert_id.cmp(&a.alert_id))
        });
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();
        Ok(AlertPage { items, total })
    }

    async fn reserve_notification(
        &self,
        alert_id: i64,
        daily_limit: i64,
        today: NaiveDate,
    ) -> Result<bool, StorageError> {
        self.update_row(alert_id, |row| {
            let same_day = row.last_notify_date == Some(today);
            if same_day && row.daily_notify_count >= daily_limit {
                return false;
            }
            row.notify_pending = true;
            row.daily_notify_count = if same_day {
                row.daily_notify_count + 1
            } else {
                1
            };
            row.last_notify_date = Some(today);
            true
        })
    }

    async fn mark_notify_pending(&self, alert_id: i64) -> Result<bool, StorageError> {
        self.update_row(alert_id, |row| {
            row.notify_pending = true;
            true
        })
    }

    async fn confirm_notification(&self, alert_id: i64) -> Result<bool, StorageError> {
        self.update_row(alert_id, |row| {
            row.notify_pending = false;
            true
        })
    }

    async fn rollback_notification(&self, alert_id: i64) -> Result<bool, StorageError> {
        self.update_row(alert_id, |row| {
            row.daily_notify_count = (row.daily_notify_count - 1).max(0);
            true
        })
    }
}
