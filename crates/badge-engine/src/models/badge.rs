//! 徽章定义相关实体
//!
//! 包含徽章定义、获取要求、时间窗口以及面向展示层的徽章视图

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{BadgeCategory, RequirementKind};

/// 一天内的时段 `[start_hour, end_hour)`
///
/// `start_hour > end_hour` 表示跨越午夜，如 22 → 2 覆盖 22:00–01:59
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl TimeWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    /// 判断某个小时（0–23）是否落在窗口内
    pub fn contains_hour(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if self.start_hour > 23 || self.end_hour > 23 {
            return Err(format!(
                "时间窗口小时数超出范围: {}-{}",
                self.start_hour, self.end_hour
            ));
        }
        if self.start_hour == self.end_hour {
            return Err("时间窗口不能为空".to_string());
        }
        Ok(())
    }
}

/// 徽章获取要求
///
/// 按 `kind` 打标签，各类型携带自身所需的参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BadgeRequirement {
    TotalCompletions { threshold: i64 },
    StreakDays { threshold: i64 },
    HabitsCreated { threshold: i64 },
    TimeWindowCompletions { threshold: i64, window: TimeWindow },
}

impl BadgeRequirement {
    pub fn kind(&self) -> RequirementKind {
        match self {
            Self::TotalCompletions { .. } => RequirementKind::TotalCompletions,
            Self::StreakDays { .. } => RequirementKind::StreakDays,
            Self::HabitsCreated { .. } => RequirementKind::HabitsCreated,
            Self::TimeWindowCompletions { .. } => RequirementKind::TimeWindowCompletions,
        }
    }

    pub fn threshold(&self) -> i64 {
        match self {
            Self::TotalCompletions { threshold }
            | Self::StreakDays { threshold }
            | Self::HabitsCreated { threshold }
            | Self::TimeWindowCompletions { threshold, .. } => *threshold,
        }
    }

    pub fn window(&self) -> Option<&TimeWindow> {
        match self {
            Self::TimeWindowCompletions { window, .. } => Some(window),
            _ => None,
        }
    }
}

/// 徽章定义
///
/// 目录中的一条不可变规则，`id` 全局唯一且运行期不变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub requirement: BadgeRequirement,
    pub category: BadgeCategory,
}

impl BadgeDefinition {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: BadgeCategory,
        requirement: BadgeRequirement,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            requirement,
            category,
        }
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("徽章 ID 不能为空".to_string());
        }
        if self.requirement.threshold() <= 0 {
            return Err(format!(
                "threshold 必须大于 0，实际为 {}",
                self.requirement.threshold()
            ));
        }
        if let Some(window) = self.requirement.window() {
            window.validate()?;
        }
        Ok(())
    }
}

/// 徽章视图
///
/// 目录定义与持久化状态合并后的展示模型，非数据库实体
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeView {
    #[serde(flatten)]
    pub badge: BadgeDefinition,
    /// 当前进度（无记录时为 0）
    pub progress: i64,
    /// 目标值（即 threshold）
    pub target: i64,
    pub is_unlocked: bool,
    pub is_seen: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}
