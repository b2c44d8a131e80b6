//! 异步通知派发：有界队列 + 固定数量 worker。
//!
//! 队列容量是背压点，worker 数量限制对外并发连接数。
//! 每个任务携带调度时刻的告警快照，投递结果决定确认或回滚。
//! 进程退出时队列中未投递的任务会丢失，notify_pending 保持为 true。

use crate::error::DispatchError;
use crate::quota::{QuotaController, Reservation};
use alarm_notify::Notifier;
use alarm_storage::AlertRecord;
use alarm_telemetry::{
    record_compensation_failure, record_dispatch_failure, record_dispatch_latency_ms,
    record_dispatch_success,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// 派发参数。
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 256,
        }
    }
}

impl DispatchConfig {
    fn sanitized(mut self) -> Self {
        if self.workers == 0 {
            self.workers = 1;
        }
        if self.queue_capacity == 0 {
            self.queue_capacity = 1;
        }
        self
    }
}

/// 派发任务。
#[derive(Debug, Clone)]
pub struct DispatchJob {
    pub alert: AlertRecord,
    pub reservation: Reservation,
    pub enqueued_at: Instant,
}

impl DispatchJob {
    pub fn new(alert: AlertRecord, reservation: Reservation) -> Self {
        Self {
            alert,
            reservation,
            enqueued_at: Instant::now(),
        }
    }
}

/// 派发队列句柄（可克隆，全部句柄释放后 worker 退出）。
#[derive(Clone)]
pub struct DispatchQueue {
    sender: mpsc::Sender<DispatchJob>,
}

impl DispatchQueue {
    /// 创建队列并启动 worker（需在 tokio 运行时内调用）。
    pub fn start(
        config: DispatchConfig,
        notifier: Arc<dyn Notifier>,
        quota: Arc<QuotaController>,
    ) -> (Self, Vec<JoinHandle<()>>) {
        let config = config.sanitized();
        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        let handles = (0..config.workers)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    receiver.clone(),
                    notifier.clone(),
                    quota.clone(),
                ))
            })
            .collect();
        info!(
            target: "alarm.notify",
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            "dispatch_workers_started"
        );
        (Self { sender }, handles)
    }

    /// 非阻塞入队；队列满或已关闭时立即返回错误。
    pub fn try_enqueue(&self, job: DispatchJob) -> Result<(), DispatchError> {
        self.sender.try_send(job).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => DispatchError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
        })
    }
}

async fn worker_loop(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<DispatchJob>>>,
    notifier: Arc<dyn Notifier>,
    quota: Arc<QuotaController>,
) {
    loop {
        let job = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };
        let Some(job) = job else {
            break;
        };
        deliver(job, notifier.as_ref(), quota.as_ref()).await;
    }
    info!(target: "alarm.notify", worker_id, "dispatch_worker_stopped");
}

/// 投递一次并执行补偿：成功确认，失败回滚（仅计数预占）。
pub async fn deliver(job: DispatchJob, notifier: &dyn Notifier, quota: &QuotaController) {
    let alert_id = job.alert.alert_id;
    let started = Instant::now();
    match notifier.send(&job.alert).await {
        Ok(()) => {
            record_dispatch_success();
            record_dispatch_latency_ms(started.elapsed().as_millis() as u64);
            info!(
                target: "alarm.notify",
                alert_id,
                queued_ms = started.duration_since(job.enqueued_at).as_millis() as u64,
                "notify_sent"
            );
            if let Err(err) = quota.confirm(alert_id).await {
                record_compensation_failure();
                error!(target: "alarm.notify", alert_id, error = %err, "notify_confirm_failed");
            }
        }
        Err(err) => {
            record_dispatch_failure();
            warn!(target: "alarm.notify", alert_id, error = %err, "notify_failed");
            if job.reservation.is_counted() {
                rollback(quota, alert_id).await;
            }
        }
    }
}

/// 回滚一次预占，失败只记录（不自动重试）。
pub async fn rollback(quota: &QuotaController, alert_id: i64) {
    if let Err(err) = quota.rollback(alert_id).await {
        record_compensation_failure();
        error!(target: "alarm.quota", alert_id, error = %err, "notify_rollback_failed");
    }
}
