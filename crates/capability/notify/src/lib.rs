//! 通知通道能力：把告警快照投递到外部消息通道。
//!
//! 调用方持有的是调度时刻的告警快照（所有权拷贝），
//! 通道实现不回读存储。失败只返回错误，补偿由调用方负责。

pub mod http;
pub mod message;

pub use http::{DEFAULT_TIMEOUT, HttpNotifier, HttpNotifierConfig};
pub use message::{AlertDetail, ChannelRoute, NotifyData, NotifyMessage};

use alarm_storage::AlertRecord;
use async_trait::async_trait;
use tracing::info;

/// 通知投递错误。
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notify config error: {0}")]
    Config(String),
    #[error("notify request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("notify channel returned status {0}")]
    Status(u16),
}

/// 通知通道抽象。
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, alert: &AlertRecord) -> Result<(), NotifyError>;
}

/// 未配置通道地址时使用。每次投递都失败，
/// 计数预占被回滚，notify_pending 保持为 true。
#[derive(Debug, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, alert: &AlertRecord) -> Result<(), NotifyError> {
        info!(
            target: "alarm.notify",
            alert_id = alert.alert_id,
            fingerprint = %alert.fingerprint,
            "notify_channel_disabled"
        );
        Err(NotifyError::Config("notify channel disabled".to_string()))
    }
}
