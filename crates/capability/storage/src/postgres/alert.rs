//! Postgres 告警存储实现

use crate::error::StorageError;
use crate::models::{AlertFilter, AlertPage, AlertRecord, AlertUpdate, NewAlert, PageRequest};
use crate::traits::AlertStore;
use crate::validation::{ensure_alert_id, ensure_fingerprint};
use chrono::{DateTime, NaiveDate, Utc};
use domain::{AlertAnnotations, AlertLabels, AlertStatus};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

const ALERT_COLUMNS: &str = "alert_id, status, starts_at, ends_at, annotations, labels, \
     fingerprint, alert_count, daily_notify_count, last_notify_date, notify_pending, \
     is_deleted, create_time, update_time";

pub struct PgAlertStore {
    pub pool: PgPool,
}

impl PgAlertStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn alert_from_row(row: &PgRow) -> Result<AlertRecord, StorageError> {
    let status: String = row.try_get("status")?;
    let annotations: Json<AlertAnnotations> = row.try_get("annotations")?;
    let labels: Json<AlertLabels> = row.try_get("labels")?;
    Ok(AlertRecord {
        alert_id: row.try_get("alert_id")?,
        status: AlertStatus::from(status),
        starts_at: row.try_get("starts_at")?,
        ends_at: row.try_get("ends_at")?,
        annotations: annotations.0,
        labels: labels.0,
        fingerprint: row.try_get("fingerprint")?,
        alert_count: row.try_get("alert_count")?,
        daily_notify_count: row.try_get("daily_notify_count")?,
        last_notify_date: row.try_get("last_notify_date")?,
        notify_pending: row.try_get("notify_pending")?,
        is_deleted: row.try_get("is_deleted")?,
        create_time: row.try_get("create_time")?,
        update_time: row.try_get("update_time")?,
    })
}

#[async_trait::async_trait]
impl AlertStore for PgAlertStore {
    async fn find_active(&self, fingerprint: &str) -> Result<Option<AlertRecord>, StorageError> {
        ensure_fingerprint(fingerprint)?;
        let sql = format!(
            "select {ALERT_COLUMNS} from prometheus_alerts \
             where fingerprint = $1 and is_deleted = false"
        );
        let row = sqlx::query(&sql)
            .bind(fingerprint)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(alert_from_row).transpose()
    }

    async fn find_by_id(&self, alert_id: i64) -> Result<Option<AlertRecord>, StorageError> {
        ensure_alert_id(alert_id)?;
        let sql = format!(
            "select {ALERT_COLUMNS} from prometheus_alerts \
             where alert_id = $1 and is_deleted = false"
        );
        let row = sqlx::query(&sql)
            .bind(alert_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(alert_from_row).transpose()
    }

    async fn upsert(&self, alert: NewAlert) -> Result<AlertRecord, StorageError> {
        ensure_fingerprint(&alert.fingerprint)?;
        sqlx::query(
            "insert into prometheus_alerts \
             (status, starts_at, ends_at, annotations, labels, fingerprint, \
              alert_count, daily_notify_count, notify_pending, is_deleted, create_time, update_time) \
             values ($1, $2, $3, $4, $5, $6, 1, 0, true, false, $7, $7) \
             on conflict (fingerprint) where is_deleted = false do update set \
             status = excluded.status, \
             starts_at = excluded.starts_at, \
             ends_at = excluded.ends_at, \
             annotations = excluded.annotations, \
             labels = excluded.labels, \
             alert_count = prometheus_alerts.alert_count + 1, \
             update_time = excluded.update_time",
        )
        .bind(alert.status.as_str())
        .bind(alert.starts_at)
        .bind(alert.ends_at)
        .bind(Json(&alert.annotations))
        .bind(Json(&alert.labels))
        .bind(&alert.fingerprint)
        .bind(alert.received_at)
        .execute(&self.pool)
        .await?;

        self.find_active(&alert.fingerprint)
            .await?
            .ok_or_else(|| StorageError::new("alert missing after upsert"))
    }

    async fn update_alert(
        &self,
        alert_id: i64,
        update: AlertUpdate,
    ) -> Result<Option<AlertRecord>, StorageError> {
        ensure_alert_id(alert_id)?;
        let sql = format!(
            "update prometheus_alerts set \
             status = $1, starts_at = $2, ends_at = $3, annotations = $4, labels = $5, \
             update_time = $6 \
             where alert_id = $7 and is_deleted = false \
             returning {ALERT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(update.status.as_str())
            .bind(update.starts_at)
            .bind(update.ends_at)
            .bind(Json(&update.annotations))
            .bind(Json(&update.labels))
            .bind(update.updated_at)
            .bind(alert_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(alert_from_row).transpose()
    }

    async fn soft_delete(&self, alert_id: i64, now: DateTime<Utc>) -> Result<bool, StorageError> {
        ensure_alert_id(alert_id)?;
        let result = sqlx::query(
            "update prometheus_alerts set is_deleted = true, update_time = $1 \
             where alert_id = $2 and is_deleted = false",
        )
        .bind(now)
        .bind(alert_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete_batch(
        &self,
        alert_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        if alert_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "update prometheus_alerts set is_deleted = true, update_time = $1 \
             where alert_id = any($2) and is_deleted = false",
        )
        .bind(now)
        .bind(alert_ids.to_vec())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_alerts(
        &self,
        filter: &AlertFilter,
        page: PageRequest,
    ) -> Result<AlertPage, StorageError> {
        let total: i64 = sqlx::query_scalar(
            "select count(*) from prometheus_alerts \
             where is_deleted = false \
             and ($1::text is null or status = $1) \
             and ($2::text is null or labels->>'severity' = $2)",
        )
        .bind(filter.status.as_deref())
        .bind(filter.severity.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "select {ALERT_COLUMNS} from prometheus_alerts \
             where is_deleted = false \
             and ($1::text is null or status = $1) \
             and ($2::text is null or labels->>'severity' = $2) \
             order by create_time desc, alert_id desc \
             limit $3 offset $4"
        );
        let rows = sqlx::query(&sql)
            .bind(filter.status.as_deref())
            .bind(filter.severity.as_deref())
            .bind(page.page_size as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(alert_from_row(&row)?);
        }
        Ok(AlertPage {
            items,
            total: total.max(0) as u64,
        })
    }

    async fn reserve_notification(
        &self,
        alert_id: i64,
        daily_limit: i64,
        today: NaiveDate,
    ) -> Result<bool, StorageError> {
        ensure_alert_id(alert_id)?;
        let result = sqlx::query(
            "update prometheus_alerts set \
             notify_pending = true, \
             daily_notify_count = case when last_notify_date = $3 \
                 then daily_notify_count + 1 else 1 end, \
             last_notify_date = $3 \
             where alert_id = $1 \
             and ((last_notify_date = $3 and daily_notify_count < $2) \
                  or last_notify_date is null \
                  or last_notify_date <> $3)",
        )
        .bind(alert_id)
        .bind(daily_limit)
        .bind(today)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_notify_pending(&self, alert_id: i64) -> Result<bool, StorageError> {
        ensure_alert_id(alert_id)?;
        let result =
            sqlx::query("update prometheus_alerts set notify_pending = true where alert_id = $1")
                .bind(alert_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn confirm_notification(&self, alert_id: i64) -> Result<bool, StorageError> {
        ensure_alert_id(alert_id)?;
        let result =
            sqlx::query("update prometheus_alerts set notify_pending = false where alert_id = $1")
                .bind(alert_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn rollback_notification(&self, alert_id: i64) -> Result<bool, StorageError> {
        ensure_alert_id(alert_id)?;
        let result = sqlx::query(
            "update prometheus_alerts set \
             daily_notify_count = greatest(daily_notify_count - 1, 0) \
             where alert_id = $1",
        )
        .bind(alert_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
