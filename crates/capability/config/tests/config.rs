use alarm_config::{AppConfig, ConfigError};

// 环境变量是进程级共享状态，全部断言放在同一个测试里顺序执行。
#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("ALARM_HTTP_ADDR", "127.0.0.1:9090");
        std::env::set_var("ALARM_NOTIFY_URL", "http://mq.local/send");
        std::env::set_var("ALARM_NOTIFY_TOPIC", "alarm");
        std::env::set_var("ALARM_DAILY_NOTIFY_LIMIT", "3");
        std::env::set_var("ALARM_RESOLVED_BYPASS_QUOTA", "true");
        std::env::set_var("ALARM_DISPATCH_WORKERS", "0");
        std::env::remove_var("ALARM_DATABASE_URL");
    }

    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:9090");
    assert!(config.database_url.is_none());
    assert_eq!(config.notify_url.as_deref(), Some("http://mq.local/send"));
    assert_eq!(config.notify_topic, "alarm");
    assert_eq!(config.notify_timeout_seconds, 30);
    assert_eq!(config.daily_notify_limit, 3);
    assert!(config.resolved_bypass_quota);
    assert_eq!(config.dispatch_workers, 1);
    assert_eq!(config.dispatch_queue_capacity, 256);

    unsafe {
        std::env::set_var("ALARM_DAILY_NOTIFY_LIMIT", "-1");
    }
    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.daily_notify_limit, -1);

    unsafe {
        std::env::set_var("ALARM_DAILY_NOTIFY_LIMIT", "many");
    }
    let err = AppConfig::from_env().expect_err("invalid limit");
    assert!(matches!(err, ConfigError::Invalid(key, _) if key == "ALARM_DAILY_NOTIFY_LIMIT"));
}
