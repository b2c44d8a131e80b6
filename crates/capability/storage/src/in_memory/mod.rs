//! 内存存储实现模块
//!
//! 用于测试和无数据库的本地运行。
//!
//! 包含以下实现：
//! - AlertStore: InMemoryAlertStore

pub mod alert;

pub use alert::*;
