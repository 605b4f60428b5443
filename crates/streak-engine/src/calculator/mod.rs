//! 连续打卡重算
//!
//! - `algorithm`: 纯计算
//! - `snapshot`: 变更检测
//! - `service`: 重算服务与触发流程

pub mod algorithm;
pub mod snapshot;
mod service;

pub use algorithm::{DayStatus, StreakComputation, compute_streak};
pub use service::{StreakCalculator, TriggerPhase};
