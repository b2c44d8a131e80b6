use std::sync::RwLock;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

/// 时钟抽象：通知配额以“自然日”为周期。
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// 当前自然日（配额重置的边界）。
    fn today(&self) -> NaiveDate;
}

/// 系统时钟：自然日按本地时区计算。
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// 手动时钟：由调用方推进时间，自然日按 UTC 计算。
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        match self.now.write() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    pub fn advance(&self, delta: Duration) {
        let next = self.now() + delta;
        self.set(next);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
