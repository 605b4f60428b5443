//! 徽章引擎枚举类型定义
//!
//! 需要落库的枚举同时支持 sqlx 和 serde 序列化

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BadgeError;

/// 触发徽章检查的事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// 习惯完成（打卡）
    HabitComplete,
    /// 新建习惯
    HabitCreate,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HabitComplete => "habit_complete",
            Self::HabitCreate => "habit_create",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = BadgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "habit_complete" => Ok(Self::HabitComplete),
            "habit_create" => Ok(Self::HabitCreate),
            other => Err(BadgeError::Validation(format!("未知事件类型: {}", other))),
        }
    }
}

/// 徽章分类（展示分组）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    /// 累计完成量
    Volume,
    /// 连续打卡
    Streak,
    /// 习惯创建
    Creation,
    /// 特定时段
    Timing,
}

/// 事件上下文中可参与阈值比较的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextField {
    TotalCompletions,
    Streak,
    HabitsCreated,
}

/// 累计策略
///
/// - `ContextThreshold`：直接比较上下文字段与阈值，不写任何计数
/// - `CounterAccumulation`：命中条件时持久化计数 +1，计数达到阈值即满足
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulationStrategy {
    ContextThreshold(ContextField),
    CounterAccumulation,
}

/// 要求类型
///
/// 新增类型时必须在 `strategy` 与 `relevant_events` 中显式归类，
/// 两处 match 均不提供默认分支。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    TotalCompletions,
    StreakDays,
    HabitsCreated,
    TimeWindowCompletions,
}

impl RequirementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalCompletions => "total_completions",
            Self::StreakDays => "streak_days",
            Self::HabitsCreated => "habits_created",
            Self::TimeWindowCompletions => "time_window_completions",
        }
    }

    /// 该要求类型使用的累计策略
    pub fn strategy(&self) -> AccumulationStrategy {
        match self {
            Self::TotalCompletions => {
                AccumulationStrategy::ContextThreshold(ContextField::TotalCompletions)
            }
            Self::StreakDays => AccumulationStrategy::ContextThreshold(ContextField::Streak),
            Self::HabitsCreated => {
                AccumulationStrategy::ContextThreshold(ContextField::HabitsCreated)
            }
            Self::TimeWindowCompletions => AccumulationStrategy::CounterAccumulation,
        }
    }

    /// 可能满足该要求的事件类型
    pub fn relevant_events(&self) -> &'static [EventType] {
        match self {
            Self::TotalCompletions | Self::StreakDays | Self::TimeWindowCompletions => {
                &[EventType::HabitComplete]
            }
            Self::HabitsCreated => &[EventType::HabitCreate],
        }
    }
}

/// 解锁来源
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum UnlockSource {
    /// 规则评估满足
    #[default]
    Rule,
    /// 手动解锁（运营或测试）
    Manual,
}

impl UnlockSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Manual => "manual",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_round_trip_str() {
        assert_eq!(
            "habit_complete".parse::<EventType>().unwrap(),
            EventType::HabitComplete
        );
        assert_eq!(EventType::HabitCreate.to_string(), "habit_create");
        assert!("habit_delete".parse::<EventType>().is_err());
    }

    #[test]
    fn test_strategy_classification() {
        assert_eq!(
            RequirementKind::StreakDays.strategy(),
            AccumulationStrategy::ContextThreshold(ContextField::Streak)
        );
        assert_eq!(
            RequirementKind::TimeWindowCompletions.strategy(),
            AccumulationStrategy::CounterAccumulation
        );
    }

    #[test]
    fn test_relevant_events() {
        assert_eq!(
            RequirementKind::StreakDays.relevant_events(),
            &[EventType::HabitComplete]
        );
        assert_eq!(
            RequirementKind::HabitsCreated.relevant_events(),
            &[EventType::HabitCreate]
        );
    }

    #[test]
    fn test_requirement_kind_serde() {
        let json = serde_json::to_string(&RequirementKind::TimeWindowCompletions).unwrap();
        assert_eq!(json, "\"time_window_completions\"");
    }
}
