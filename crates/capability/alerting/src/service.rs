//! 告警接收编排：指纹 → upsert → 配额预占 → 异步派发。

use crate::dispatch::{DispatchConfig, DispatchJob, DispatchQueue, rollback};
use crate::error::AlertError;
use crate::quota::{QuotaController, QuotaPolicy, Reservation};
use alarm_fingerprint::identify;
use alarm_notify::Notifier;
use alarm_storage::{
    AlertFilter, AlertPage, AlertRecord, AlertStore, AlertUpdate, NewAlert, PageRequest,
};
use alarm_telemetry::{
    record_alert_ingested, record_dispatch_rejected, record_ingest_failure,
    record_notify_reserved, record_notify_skipped,
};
use chrono::{DateTime, Utc};
use domain::{AlertAnnotations, AlertLabels, AlertStatus, Clock};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 上游推送的告警事件（时间为 RFC3339 字符串）。
#[derive(Debug, Clone, Default)]
pub struct AlertEvent {
    pub status: String,
    pub starts_at: String,
    pub ends_at: Option<String>,
    pub annotations: AlertAnnotations,
    pub labels: AlertLabels,
}

/// 流水线参数。
#[derive(Debug, Clone, Default)]
pub struct AlertingConfig {
    pub quota: QuotaPolicy,
    pub dispatch: DispatchConfig,
}

struct ParsedEvent {
    status: AlertStatus,
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
    annotations: AlertAnnotations,
    labels: AlertLabels,
}

#[derive(Clone)]
pub struct AlertService {
    store: Arc<dyn AlertStore>,
    clock: Arc<dyn Clock>,
    quota: Arc<QuotaController>,
    dispatcher: DispatchQueue,
}

impl AlertService {
    /// 构建服务并启动派发 worker（需在 tokio 运行时内调用）。
    pub fn new(
        store: Arc<dyn AlertStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: AlertingConfig,
    ) -> Self {
        let quota = Arc::new(QuotaController::new(
            store.clone(),
            clock.clone(),
            config.quota,
        ));
        let (dispatcher, _workers) = DispatchQueue::start(config.dispatch, notifier, quota.clone());
        Self {
            store,
            clock,
            quota,
            dispatcher,
        }
    }

    /// 接收一条告警，返回合并后的记录；通知在后台完成，不等待结果。
    pub async fn ingest(&self, event: AlertEvent) -> Result<AlertRecord, AlertError> {
        let parsed = parse_event(event).inspect_err(|_| record_ingest_failure())?;
        let identity = identify(&parsed.labels);
        let record = self
            .store
            .upsert(NewAlert {
                status: parsed.status,
                starts_at: Some(parsed.starts_at),
                ends_at: parsed.ends_at,
                annotations: parsed.annotations,
                labels: parsed.labels,
                fingerprint: identity.fingerprint,
                received_at: self.clock.now(),
            })
            .await
            .inspect_err(|_| record_ingest_failure())?;
        record_alert_ingested();
        info!(
            target: "alarm.ingest",
            alert_id = record.alert_id,
            fingerprint = %record.fingerprint,
            status = %record.status,
            alert_count = record.alert_count,
            "alert_upserted"
        );

        let reservation = match self.quota.try_reserve(&record).await {
            Ok(reservation) => reservation,
            Err(err) => {
                record_notify_skipped();
                error!(
                    target: "alarm.quota",
                    alert_id = record.alert_id,
                    error = %err,
                    "notify_reserve_failed"
                );
                return Ok(record);
            }
        };
        if !reservation.should_dispatch() {
            record_notify_skipped();
            info!(
                target: "alarm.quota",
                alert_id = record.alert_id,
                daily_limit = self.quota.policy().daily_limit,
                "notify_quota_exhausted"
            );
            return Ok(record);
        }
        record_notify_reserved();
        self.schedule(record.clone(), reservation).await;
        Ok(record)
    }

    async fn schedule(&self, alert: AlertRecord, reservation: Reservation) {
        let alert_id = alert.alert_id;
        if let Err(err) = self
            .dispatcher
            .try_enqueue(DispatchJob::new(alert, reservation))
        {
            record_dispatch_rejected();
            warn!(target: "alarm.notify", alert_id, error = %err, "notify_enqueue_rejected");
            if reservation.is_counted() {
                rollback(&self.quota, alert_id).await;
            }
        }
    }

    pub async fn get_alert(&self, alert_id: i64) -> Result<AlertRecord, AlertError> {
        ensure_alert_id(alert_id)?;
        self.store
            .find_by_id(alert_id)
            .await?
            .ok_or(AlertError::NotFound(alert_id))
    }

    /// 更新告警内容（不重算指纹，不影响通知计数）。
    pub async fn update_alert(
        &self,
        alert_id: i64,
        event: AlertEvent,
    ) -> Result<AlertRecord, AlertError> {
        ensure_alert_id(alert_id)?;
        let parsed = parse_event(event)?;
        self.store
            .update_alert(
                alert_id,
                AlertUpdate {
                    status: parsed.status,
                    starts_at: Some(parsed.starts_at),
                    ends_at: parsed.ends_at,
                    annotations: parsed.annotations,
                    labels: parsed.labels,
                    updated_at: self.clock.now(),
                },
            )
            .await?
            .ok_or(AlertError::NotFound(alert_id))
    }

    /// 软删除（重复删除不报错）。
    pub async fn delete_alert(&self, alert_id: i64) -> Result<(), AlertError> {
        ensure_alert_id(alert_id)?;
        let deleted = self.store.soft_delete(alert_id, self.clock.now()).await?;
        info!(target: "alarm.ingest", alert_id, deleted, "alert_deleted");
        Ok(())
    }

    pub async fn delete_alerts(&self, alert_ids: &[i64]) -> Result<u64, AlertError> {
        if alert_ids.is_empty() {
            return Err(AlertError::Validation("ids required".to_string()));
        }
        for alert_id in alert_ids {
            ensure_alert_id(*alert_id)?;
        }
        let deleted = self
            .store
            .soft_delete_batch(alert_ids, self.clock.now())
            .await?;
        info!(
            target: "alarm.ingest",
            requested = alert_ids.len(),
            deleted,
            "alerts_deleted"
        );
        Ok(deleted)
    }

    pub async fn list_alerts(
        &self,
        filter: AlertFilter,
        page: PageRequest,
    ) -> Result<AlertPage, AlertError> {
        let filter = AlertFilter {
            status: non_empty(filter.status),
            severity: non_empty(filter.severity),
        };
        Ok(self.store.list_alerts(&filter, page).await?)
    }
}

fn parse_event(event: AlertEvent) -> Result<ParsedEvent, AlertError> {
    let status = event.status.trim();
    if status.is_empty() {
        return Err(AlertError::Validation("status required".to_string()));
    }
    let starts_at = parse_time(&event.starts_at, "startsAt")?
        .ok_or_else(|| AlertError::Validation("startsAt required".to_string()))?;
    let ends_at = match event.ends_at.as_deref() {
        Some(value) => parse_time(value, "endsAt")?,
        None => None,
    };
    Ok(ParsedEvent {
        status: AlertStatus::from(status),
        starts_at,
        ends_at,
        annotations: event.annotations,
        labels: event.labels,
    })
}

/// 空字符串视为未提供。
fn parse_time(value: &str, field: &str) -> Result<Option<DateTime<Utc>>, AlertError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|ts| Some(ts.with_timezone(&Utc)))
        .map_err(|err| AlertError::Validation(format!("invalid {field}: {err}")))
}

fn ensure_alert_id(alert_id: i64) -> Result<(), AlertError> {
    if alert_id <= 0 {
        return Err(AlertError::Validation(format!("invalid alert id: {alert_id}")));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_event_requires_status_and_start() {
        let err = parse_event(AlertEvent {
            status: " ".to_string(),
            starts_at: "2024-05-01T08:00:00Z".to_string(),
            ..AlertEvent::default()
        });
        assert!(matches!(err, Err(AlertError::Validation(_))));

        let err = parse_event(AlertEvent {
            status: "firing".to_string(),
            starts_at: String::new(),
            ..AlertEvent::default()
        });
        assert!(matches!(err, Err(AlertError::Validation(message)) if message == "startsAt required"));
    }

    #[test]
    fn parse_event_accepts_offsets_and_empty_end() {
        let parsed = parse_event(AlertEvent {
            status: "resolved".to_string(),
            starts_at: "2024-05-01T16:00:00+08:00".to_string(),
            ends_at: Some(String::new()),
            ..AlertEvent::default()
        })
        .expect("parsed");
        assert_eq!(parsed.status, AlertStatus::Resolved);
        assert_eq!(parsed.starts_at.to_rfc3339(), "2024-05-01T08:00:00+00:00");
        assert!(parsed.ends_at.is_none());
    }

    #[test]
    fn parse_event_rejects_bad_end() {
        let err = parse_event(AlertEvent {
            status: "firing".to_string(),
            starts_at: "2024-05-01T08:00:00Z".to_string(),
            ends_at: Some("yesterday".to_string()),
            ..AlertEvent::default()
        });
        assert!(matches!(err, Err(AlertError::Validation(message)) if message.starts_with("invalid endsAt")));
    }
}
