//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    /// 未配置时使用内存存储。
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// 未配置时通知只记录日志。
    pub notify_url: Option<String>,
    pub notify_topic: String,
    pub notify_tag: String,
    pub notify_receiver: String,
    pub notify_timeout_seconds: u64,
    /// 单条告警每日通知上限，<= 0 表示不限制。
    pub daily_notify_limit: i64,
    /// resolved 事件不占用每日配额。
    pub resolved_bypass_quota: bool,
    pub dispatch_workers: usize,
    pub dispatch_queue_capacity: usize,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr =
            env::var("ALARM_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8888".to_string());
        let database_url = read_optional("ALARM_DATABASE_URL");
        let db_max_connections = read_u32_with_default("ALARM_DB_MAX_CONNECTIONS", 8)?;
        let notify_url = read_optional("ALARM_NOTIFY_URL");
        let notify_topic = env::var("ALARM_NOTIFY_TOPIC").unwrap_or_default();
        let notify_tag = env::var("ALARM_NOTIFY_TAG").unwrap_or_default();
        let notify_receiver = env::var("ALARM_NOTIFY_RECEIVER").unwrap_or_default();
        let notify_timeout_seconds = read_u64_with_default("ALARM_NOTIFY_TIMEOUT_SECONDS", 30)?;
        let daily_notify_limit = read_i64_with_default("ALARM_DAILY_NOTIFY_LIMIT", 0)?;
        let resolved_bypass_quota = read_bool_with_default("ALARM_RESOLVED_BYPASS_QUOTA", false);
        let dispatch_workers = read_usize_with_default("ALARM_DISPATCH_WORKERS", 4)?.max(1);
        let dispatch_queue_capacity =
            read_usize_with_default("ALARM_DISPATCH_QUEUE_CAPACITY", 256)?.max(1);

        Ok(Self {
            http_addr,
            database_url,
            db_max_connections,
            notify_url,
            notify_topic,
            notify_tag,
            notify_receiver,
            notify_timeout_seconds,
            daily_notify_limit,
            resolved_bypass_quota,
            dispatch_workers,
            dispatch_queue_capacity,
        })
    }
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_i64_with_default(key: &str, default: i64) -> Result<i64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_usize_with_default(key: &str, default: usize) -> Result<usize, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<usize>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
