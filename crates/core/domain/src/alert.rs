use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 告警状态（按上游原样保存，未知状态不丢弃）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertStatus {
    Firing,
    Resolved,
    Other(String),
}

impl AlertStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AlertStatus::Firing => "firing",
            AlertStatus::Resolved => "resolved",
            AlertStatus::Other(value) => value.as_str(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, AlertStatus::Resolved)
    }
}

impl From<&str> for AlertStatus {
    fn from(value: &str) -> Self {
        match value {
            "firing" => AlertStatus::Firing,
            "resolved" => AlertStatus::Resolved,
            other => AlertStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for AlertStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "firing" => AlertStatus::Firing,
            "resolved" => AlertStatus::Resolved,
            _ => AlertStatus::Other(value),
        }
    }
}

impl From<AlertStatus> for String {
    fn from(value: AlertStatus) -> Self {
        match value {
            AlertStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 告警 labels。
///
/// 指纹只依赖对象类型/名称、显示名、指标比较符与阈值；
/// 其余字段用于通知内容与列表过滤。上游新增字段进入 `extra`，
/// 写库时原样保留。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertLabels {
    pub alert_cluster: String,
    pub alert_indicator: String,
    pub alert_indicator_aggregate_range: String,
    pub alert_indicator_alias: String,
    pub alert_indicator_comparison: String,
    pub alert_indicator_threshold: String,
    pub alert_indicator_unit: String,
    pub alert_involved_object_kind: String,
    pub alert_involved_object_name: String,
    pub alert_involved_object_options: String,
    pub alert_kind: String,
    pub alert_name: String,
    pub alert_namespace: String,
    pub alert_project: String,
    pub alert_resource: String,
    pub alert_source: String,
    pub alertname: String,
    /// 显示名：`{"zh":"..","en":".."}` 或纯文本。
    pub display_name: String,
    pub node_name: String,
    pub severity: String,
    // 兼容字段（主机类告警）
    pub host_ip: String,
    pub instance: String,
    pub ip: String,
    pub node: String,
    pub device: String,
    pub mountpoint: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// 告警 annotations。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertAnnotations {
    pub alert_current_value: String,
    pub alert_notifications: String,
    pub display_name: String,
    pub summary: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
