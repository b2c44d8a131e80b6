use alarm_storage::StorageError;

/// 告警流水线错误（同步路径）。
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("alert not found: {0}")]
    NotFound(i64),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// 派发队列错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("dispatch queue full")]
    QueueFull,
    #[error("dispatch queue closed")]
    Closed,
}
