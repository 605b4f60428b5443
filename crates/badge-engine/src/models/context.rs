//! 事件上下文
//!
//! 触发徽章检查时携带的稀疏信号快照，所有字段均可缺省

use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

use super::enums::ContextField;

/// 事件上下文
///
/// 缺失的字段只会让对应要求不满足，不会产生错误
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    #[serde(default)]
    pub total_completions: Option<i64>,
    #[serde(default)]
    pub streak: Option<i64>,
    #[serde(default)]
    pub habits_created: Option<i64>,
    /// 事件发生时间（带本地时区偏移，时间窗口按本地时钟判断）
    #[serde(default)]
    pub timestamp: Option<DateTime<FixedOffset>>,
}

impl EventContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_total_completions(mut self, value: i64) -> Self {
        self.total_completions = Some(value);
        self
    }

    pub fn with_streak(mut self, value: i64) -> Self {
        self.streak = Some(value);
        self
    }

    pub fn with_habits_created(mut self, value: i64) -> Self {
        self.habits_created = Some(value);
        self
    }

    pub fn with_timestamp(mut self, value: DateTime<FixedOffset>) -> Self {
        self.timestamp = Some(value);
        self
    }

    /// 读取参与阈值比较的字段
    pub fn value_of(&self, field: ContextField) -> Option<i64> {
        match field {
            ContextField::TotalCompletions => self.total_completions,
            ContextField::Streak => self.streak,
            ContextField::HabitsCreated => self.habits_created,
        }
    }

    /// 事件发生时的本地小时
    pub fn local_hour(&self) -> Option<u32> {
        self.timestamp.map(|ts| ts.hour())
    }
}
