//! 每日通知配额控制。
//!
//! 预占、确认、回滚都委托给存储层的单条条件更新，
//! 本模块只决定“是否计数”与“用哪一天”。

use alarm_storage::{AlertRecord, AlertStore, StorageError};
use domain::Clock;
use std::sync::Arc;
use tracing::debug;

/// 预占结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// 占用了一个当日配额，投递失败需回滚。
    Counted,
    /// 不计数（不限制，或 resolved 豁免），只标记 notify_pending。
    Unmetered,
    /// 当日配额已用完。
    Exhausted,
}

impl Reservation {
    pub fn should_dispatch(&self) -> bool {
        !matches!(self, Reservation::Exhausted)
    }

    pub fn is_counted(&self) -> bool {
        matches!(self, Reservation::Counted)
    }
}

/// 配额策略。
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotaPolicy {
    /// <= 0 表示不限制。
    pub daily_limit: i64,
    pub resolved_bypass: bool,
}

pub struct QuotaController {
    store: Arc<dyn AlertStore>,
    clock: Arc<dyn Clock>,
    policy: QuotaPolicy,
}

impl QuotaController {
    pub fn new(store: Arc<dyn AlertStore>, clock: Arc<dyn Clock>, policy: QuotaPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> QuotaPolicy {
        self.policy
    }

    pub async fn try_reserve(&self, alert: &AlertRecord) -> Result<Reservation, StorageError> {
        let unmetered = self.policy.daily_limit <= 0
            || (self.policy.resolved_bypass && alert.status.is_resolved());
        if unmetered {
            self.store.mark_notify_pending(alert.alert_id).await?;
            return Ok(Reservation::Unmetered);
        }

        let today = self.clock.today();
        let reserved = self
            .store
            .reserve_notification(alert.alert_id, self.policy.daily_limit, today)
            .await?;
        debug!(
            target: "alarm.quota",
            alert_id = alert.alert_id,
            daily_limit = self.policy.daily_limit,
            today = %today,
            reserved,
            "notify_reserve_attempt"
        );
        Ok(if reserved {
            Reservation::Counted
        } else {
            Reservation::Exhausted
        })
    }

    /// 投递成功：清除 notify_pending。
    pub async fn confirm(&self, alert_id: i64) -> Result<(), StorageError> {
        self.store.confirm_notification(alert_id).await?;
        Ok(())
    }

    /// 投递失败：归还一个配额（计数不低于 0）。
    pub async fn rollback(&self, alert_id: i64) -> Result<(), StorageError> {
        self.store.rollback_notification(alert_id).await?;
        Ok(())
    }
}
