//! HTTP 消息通道实现。

use crate::message::{ChannelRoute, NotifyMessage};
use crate::{NotifyError, Notifier};
use alarm_storage::AlertRecord;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// 默认请求超时。
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP 通道配置。
#[derive(Debug, Clone)]
pub struct HttpNotifierConfig {
    pub url: String,
    pub route: ChannelRoute,
    pub timeout: Duration,
}

/// 向消息通道 POST JSON 的通知器（连接池复用）。
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    url: String,
    route: ChannelRoute,
}

impl HttpNotifier {
    pub fn new(config: HttpNotifierConfig) -> Result<Self, NotifyError> {
        if config.url.trim().is_empty() {
            return Err(NotifyError::Config("notify url required".to_string()));
        }
        let timeout = if config.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            config.timeout
        };
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|err| NotifyError::Config(err.to_string()))?;
        Ok(Self {
            client,
            url: config.url,
            route: config.route,
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, alert: &AlertRecord) -> Result<(), NotifyError> {
        let message = NotifyMessage::from_alert(alert, &self.route);
        debug!(
            target: "alarm.notify",
            alert_id = alert.alert_id,
            title = %message.data.title,
            "notify_message_built"
        );
        let response = self.client.post(&self.url).json(&message).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        info!(
            target: "alarm.notify",
            alert_id = alert.alert_id,
            status = status.as_u16(),
            "notify_delivered"
        );
        Ok(())
    }
}
