//! 连续打卡引擎
//!
//! 根据习惯完成历史与假期区间全量重算每个习惯的当前/最长连续天数，
//! 并以最新的连续天数为上下文驱动徽章判定。
//!
//! ## 模块结构
//!
//! - `models`: 习惯、假期与连续状态
//! - `error`: 错误类型定义
//! - `clock`: 可注入的时钟
//! - `source`: 习惯与假期数据源
//! - `calculator`: 重算算法、变更检测与重算服务
//! - `evaluator`: 徽章判定接口
//! - `notifier`: 解锁通知订阅

pub mod calculator;
pub mod clock;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod notifier;
pub mod source;

pub use calculator::{StreakCalculator, TriggerPhase, compute_streak};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Result, StreakError};
pub use evaluator::UnlockEvaluator;
pub use models::*;
pub use notifier::{Subscription, UnlockNotifier};
pub use source::{HabitSource, InMemoryHabitSource, InMemoryVacationSource, VacationSource};
