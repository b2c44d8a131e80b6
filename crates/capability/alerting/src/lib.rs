//! # 告警流水线
//!
//! 一次接收的完整链路：
//!
//! 1. 校验事件（失败不写库）
//! 2. 计算指纹，upsert 收敛到唯一的未删除记录（alert_count 累加）
//! 3. 原子预占当日通知配额（耗尽不是错误；预占执行失败只记录日志）
//! 4. 预占成功则把告警快照放入有界队列，立即返回合并后的记录
//! 5. worker 投递：成功确认（清除 notify_pending），失败回滚计数
//!
//! 后台链路的任何错误都不会传回接收请求。
//! notify_pending 只在确认送达后清除，是“仍欠一次通知”的持久信号。

pub mod dispatch;
pub mod error;
pub mod quota;
pub mod service;

pub use dispatch::{DispatchConfig, DispatchJob, DispatchQueue, deliver};
pub use error::{AlertError, DispatchError};
pub use quota::{QuotaController, QuotaPolicy, Reservation};
pub use service::{AlertEvent, AlertService, AlertingConfig};
