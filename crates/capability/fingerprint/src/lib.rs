//! 告警指纹能力。
//!
//! 指纹只由告警“描述”决定，与状态无关：同一对象、同一指标、
//! 同一阈值的 firing 与 resolved 事件收敛到同一条记录。
//!
//! 描述 = 告警对象 + 显示名 + 比较符 + 阈值（单个空格连接），
//! 指纹 = 描述的 MD5（32 位十六进制小写）。
//!
//! 本模块为纯函数，唯一副作用是 i18n 显示名解析失败时的 warn 日志。

pub mod mapping;

pub use mapping::{map_object_kind, map_severity, map_status};

use domain::{AlertLabels, AlertStatus};
use serde::Deserialize;
use tracing::warn;

/// 一次计算得到的告警标识。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertIdentity {
    /// 告警对象（对象类型中文名 + 对象名）。
    pub object: String,
    pub display_name: String,
    pub description: String,
    pub fingerprint: String,
}

/// 缺失或为 null 的语言视为空。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct I18nText {
    zh: Option<String>,
    en: Option<String>,
}

/// 解析国际化字段，中文优先。
///
/// 非 `{` 开头的文本原样返回；JSON 解析失败时记录 warn 并原样返回。
pub fn parse_i18n_field(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if !raw.trim().starts_with('{') {
        return raw.to_string();
    }
    match serde_json::from_str::<I18nText>(raw) {
        Ok(text) => text
            .zh
            .filter(|value| !value.is_empty())
            .or(text.en)
            .unwrap_or_default(),
        Err(err) => {
            warn!(target: "alarm.fingerprint", input = %raw, error = %err, "i18n_parse_failed");
            raw.to_string()
        }
    }
}

/// 显示名：display_name → alert_indicator_alias → alert_indicator，
/// 并去掉与对象类型重复的前缀。
pub fn display_name(labels: &AlertLabels, object_kind: &str) -> String {
    let mut name = parse_i18n_field(&labels.display_name);
    if name.is_empty() {
        name = labels.alert_indicator_alias.clone();
    }
    if name.is_empty() {
        name = labels.alert_indicator.clone();
    }
    match name.strip_prefix(object_kind) {
        Some(rest) if !object_kind.is_empty() => rest.to_string(),
        _ => name,
    }
}

pub fn alert_object(labels: &AlertLabels) -> String {
    format!(
        "{}{}",
        map_object_kind(&labels.alert_involved_object_kind),
        labels.alert_involved_object_name
    )
}

pub fn alert_description(labels: &AlertLabels) -> String {
    identify(labels).description
}

/// 告警指纹（MD5 十六进制小写）。
pub fn fingerprint(labels: &AlertLabels) -> String {
    identify(labels).fingerprint
}

pub fn identify(labels: &AlertLabels) -> AlertIdentity {
    let kind = map_object_kind(&labels.alert_involved_object_kind);
    let object = alert_object(labels);
    let display_name = display_name(labels, kind);
    let description = format!(
        "{} {} {} {}",
        object,
        display_name,
        labels.alert_indicator_comparison,
        labels.alert_indicator_threshold
    );
    let fingerprint = format!("{:x}", md5::compute(description.as_bytes()));
    AlertIdentity {
        object,
        display_name,
        description,
        fingerprint,
    }
}

/// 通知标题：`【状态】PAAS 平台告警：描述`。
pub fn email_subject(status: &AlertStatus, description: &str) -> String {
    format!("【{}】PAAS 平台告警：{}", map_status(status), description)
}
