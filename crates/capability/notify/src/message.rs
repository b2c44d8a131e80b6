//! 通知消息体。
//!
//! 字段与外部消息通道约定一致（camelCase）：
//! `{topic, tag, data: {title, receiver, alertDetail: {...}}}`。

use alarm_fingerprint::{email_subject, identify, map_severity, map_status};
use alarm_storage::AlertRecord;
use chrono::Local;
use serde::Serialize;

/// 通道路由字段（来自配置）。
#[derive(Debug, Clone, Default)]
pub struct ChannelRoute {
    pub topic: String,
    pub tag: String,
    pub receiver: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyMessage {
    pub topic: String,
    pub tag: String,
    pub data: NotifyData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyData {
    pub title: String,
    pub receiver: String,
    pub alert_detail: AlertDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDetail {
    pub status: String,
    pub severity: String,
    pub cluster: String,
    pub object: String,
    pub indicator: String,
    pub summary: String,
    pub trigger_value: String,
    pub alert_time: String,
    pub remark: String,
}

const ALERT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl NotifyMessage {
    /// 由告警快照构建消息（告警时间按本地时区展示）。
    pub fn from_alert(alert: &AlertRecord, route: &ChannelRoute) -> Self {
        let identity = identify(&alert.labels);
        let alert_time = alert
            .starts_at
            .map(|ts| ts.with_timezone(&Local).format(ALERT_TIME_FORMAT).to_string())
            .unwrap_or_default();
        Self {
            topic: route.topic.clone(),
            tag: route.tag.clone(),
            data: NotifyData {
                title: email_subject(&alert.status, &identity.description),
                receiver: route.receiver.clone(),
                alert_detail: AlertDetail {
                    status: map_status(&alert.status).to_string(),
                    severity: map_severity(&alert.labels.severity).to_string(),
                    cluster: alert.labels.alert_cluster.clone(),
                    object: identity.object,
                    indicator: alert.labels.alert_resource.clone(),
                    summary: identity.description,
                    trigger_value: alert.annotations.alert_current_value.clone(),
                    alert_time,
                    remark: String::new(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use domain::{AlertAnnotations, AlertLabels, AlertStatus};

    fn record() -> AlertRecord {
        let starts_at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        AlertRecord {
            alert_id: 7,
            status: AlertStatus::Firing,
            starts_at: Some(starts_at),
            ends_at: None,
            annotations: AlertAnnotations {
                alert_current_value: "93.5".to_string(),
                ..AlertAnnotations::default()
            },
            labels: AlertLabels {
                alert_cluster: "prod".to_string(),
                alert_resource: "cpu".to_string(),
                alert_involved_object_kind: "Node".to_string(),
                alert_involved_object_name: "node-1".to_string(),
                display_name: r#"{"zh":"CPU使用率高","en":"High CPU"}"#.to_string(),
                alert_indicator_comparison: ">".to_string(),
                alert_indicator_threshold: "90".to_string(),
                severity: "High".to_string(),
                ..AlertLabels::default()
            },
            fingerprint: "fp".to_string(),
            alert_count: 1,
            daily_notify_count: 1,
            last_notify_date: None,
            notify_pending: true,
            is_deleted: false,
            create_time: starts_at,
            update_time: starts_at,
        }
    }

    #[test]
    fn builds_channel_message() {
        let route = ChannelRoute {
            topic: "alarm".to_string(),
            tag: "paas".to_string(),
            receiver: "ops@example.com".to_string(),
        };
        let alert = record();
        let message = NotifyMessage::from_alert(&alert, &route);

        assert_eq!(message.topic, "alarm");
        assert_eq!(message.data.receiver, "ops@example.com");
        assert_eq!(
            message.data.title,
            "【告警中】PAAS 平台告警：节点node-1 CPU使用率高 > 90"
        );
        let detail = &message.data.alert_detail;
        assert_eq!(detail.status, "告警中");
        assert_eq!(detail.severity, "严重");
        assert_eq!(detail.object, "节点node-1");
        assert_eq!(detail.indicator, "cpu");
        assert_eq!(detail.trigger_value, "93.5");
        assert_eq!(
            detail.alert_time,
            alert
                .starts_at
                .unwrap()
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        );
        assert!(detail.remark.is_empty());
    }

    #[test]
    fn serializes_camel_case() {
        let message = NotifyMessage::from_alert(&record(), &ChannelRoute::default());
        let value = serde_json::to_value(&message).expect("json");
        assert!(value["data"]["alertDetail"]["triggerValue"].is_string());
        assert!(value["data"]["alertDetail"]["alertTime"].is_string());
    }
}
