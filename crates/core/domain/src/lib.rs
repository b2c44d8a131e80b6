//! 告警领域模型：所有能力模块共享的值类型。
//!
//! - `alert`：告警状态、labels、annotations（保留上游未知字段）
//! - `clock`：时钟抽象（通知配额按自然日计算）

pub mod alert;
pub mod clock;

pub use alert::{AlertAnnotations, AlertLabels, AlertStatus};
pub use clock::{Clock, ManualClock, SystemClock};
