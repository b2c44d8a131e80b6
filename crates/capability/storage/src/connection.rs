//! 数据库连接管理
//!
//! 提供数据库连接池初始化功能：
//! - connect_pool：建立 Postgres 连接池
//! - ensure_schema：创建告警表与索引（幂等）

use crate::error::StorageError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// 默认最大连接数。
pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;

const SCHEMA_SQL: &str = include_str!("../migrations/0001_prometheus_alerts.sql");

/// 建立 Postgres 连接池
///
/// # 参数
/// - `database_url`：Postgres 连接字符串
/// - `max_connections`：最大连接数（0 时使用默认值 8）
pub async fn connect_pool(database_url: &str, max_connections: u32) -> Result<PgPool, StorageError> {
    let max_connections = if max_connections == 0 {
        DEFAULT_MAX_CONNECTIONS
    } else {
        max_connections
    };
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// 执行建表脚本（可重复执行）。
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}
