//! 时钟
//!
//! 重算以"今天"为起点向前遍历，时钟可注入以便测试固定日期。

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate};
use parking_lot::RwLock;

/// 时钟接口
pub trait Clock: Send + Sync {
    /// 当前本地时间（带时区偏移）
    fn now(&self) -> DateTime<FixedOffset>;

    /// 本地日期
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// 固定时钟，可手动拨动
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.now.write() = now;
    }

    pub fn advance_days(&self, days: i64) {
        let mut now = self.now.write();
        *now += Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.read()
    }
}
