//! 验证辅助函数
//!
//! - ensure_alert_id：告警 ID 必须为正
//! - ensure_fingerprint：指纹非空
//!
//! 所有存储实现在访问数据前调用，内存与 PostgreSQL 行为一致。

use crate::error::StorageError;

/// 验证告警 ID
pub fn ensure_alert_id(alert_id: i64) -> Result<(), StorageError> {
    if alert_id <= 0 {
        return Err(StorageError::new("alert_id must be positive"));
    }
    Ok(())
}

/// 验证指纹非空
pub fn ensure_fingerprint(fingerprint: &str) -> Result<(), StorageError> {
    if fingerprint.trim().is_empty() {
        return Err(StorageError::new("fingerprint required"));
    }
    Ok(())
}
