//! 连续打卡领域模型
//!
//! 习惯与假期由外部协作方提供，本模块只读；`StreakState` 每次重算后整体覆盖。

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

fn default_daily_target() -> u32 {
    1
}

/// 习惯
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    /// 日期 → 当天完成次数
    #[serde(default)]
    pub completions: BTreeMap<NaiveDate, u32>,
    /// 计划执行的星期（0 = 周日 … 6 = 周六），为空表示每天
    #[serde(default)]
    pub selected_days: BTreeSet<u8>,
    /// 当天完成次数达到该值才算完成
    #[serde(default = "default_daily_target")]
    pub daily_target: u32,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            completions: BTreeMap::new(),
            selected_days: BTreeSet::new(),
            daily_target: default_daily_target(),
            created_at,
        }
    }

    pub fn with_selected_days(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.selected_days = days.into_iter().collect();
        self
    }

    pub fn with_daily_target(mut self, target: u32) -> Self {
        self.daily_target = target;
        self
    }

    pub fn with_completion(mut self, date: NaiveDate, count: u32) -> Self {
        self.completions.insert(date, count);
        self
    }

    /// 该日期是否在计划内
    pub fn is_scheduled(&self, date: NaiveDate) -> bool {
        if self.selected_days.is_empty() {
            return true;
        }
        let weekday = date.weekday().num_days_from_sunday() as u8;
        self.selected_days.contains(&weekday)
    }

    /// 该日期是否达到当日目标
    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        self.completions
            .get(&date)
            .is_some_and(|&count| count > 0 && count >= self.daily_target)
    }

    /// 历史完成次数总和
    pub fn total_completions(&self) -> u64 {
        self.completions.values().map(|&c| u64::from(c)).sum()
    }

    /// 最近一次达标的日期
    pub fn last_completed_on(&self) -> Option<NaiveDate> {
        self.completions
            .keys()
            .rev()
            .copied()
            .find(|&date| self.is_completed_on(date))
    }

    /// 历史起点：创建日期与最早完成记录中较早者
    pub fn history_start(&self) -> NaiveDate {
        let created = self.created_at.date_naive();
        match self.completions.keys().next() {
            Some(&first) if first < created => first,
            _ => created,
        }
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if self.daily_target == 0 {
            return Err("daily_target 必须大于 0".to_string());
        }
        if let Some(day) = self.selected_days.iter().find(|&&d| d > 6) {
            return Err(format!("星期取值超出范围: {}", day));
        }
        Ok(())
    }
}

/// 假期区间
///
/// `end_date` 为空表示开放式区间，仅在假期模式开启时生效
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationInterval {
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl VacationInterval {
    pub fn closed(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date: Some(end_date),
        }
    }

    pub fn open(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date: None,
        }
    }

    /// 该日期是否被区间覆盖
    pub fn covers(&self, date: NaiveDate, vacation_mode_active: bool) -> bool {
        if date < self.start_date {
            return false;
        }
        match self.end_date {
            Some(end) => date <= end,
            None => vacation_mode_active,
        }
    }
}

/// 假期协作方提供的状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationState {
    #[serde(default)]
    pub intervals: Vec<VacationInterval>,
    /// 假期模式当前是否开启
    #[serde(default)]
    pub active: bool,
}

impl VacationState {
    pub fn new(intervals: Vec<VacationInterval>, active: bool) -> Self {
        Self { intervals, active }
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.intervals
            .iter()
            .any(|interval| interval.covers(date, self.active))
    }
}

/// 单个习惯的连续打卡状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub habit_id: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completions: u64,
    pub last_completed_on: Option<NaiveDate>,
    pub last_calculated: DateTime<Utc>,
}

/// 单个习惯的重算失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitFailure {
    pub habit_id: String,
    pub error: String,
}

/// 一次重算的结果
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculationOutcome {
    /// 本次运行 ID
    pub run_id: String,
    /// 无变化而跳过
    pub skipped: bool,
    pub recalculated: Vec<String>,
    pub failed: Vec<HabitFailure>,
    /// 本次新解锁的徽章 ID
    pub unlocked: Vec<String>,
}

impl RecalculationOutcome {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_schedule_uses_sunday_zero() {
        // 2024-01-07 是周日
        let habit = Habit::new("h", created()).with_selected_days([0, 6]);
        assert!(habit.is_scheduled(date(2024, 1, 7)));
        assert!(habit.is_scheduled(date(2024, 1, 6)));
        assert!(!habit.is_scheduled(date(2024, 1, 8)));
    }

    #[test]
    fn test_empty_schedule_means_every_day() {
        let habit = Habit::new("h", created());
        assert!(habit.is_scheduled(date(2024, 1, 3)));
    }

    #[test]
    fn test_daily_target() {
        let habit = Habit::new("h", created())
            .with_daily_target(2)
            .with_completion(date(2024, 1, 2), 1)
            .with_completion(date(2024, 1, 3), 2)
            .with_completion(date(2024, 1, 4), 0);
        assert!(!habit.is_completed_on(date(2024, 1, 2)));
        assert!(habit.is_completed_on(date(2024, 1, 3)));
        assert!(!habit.is_completed_on(date(2024, 1, 4)));
        assert_eq!(habit.total_completions(), 3);
        assert_eq!(habit.last_completed_on(), Some(date(2024, 1, 3)));
    }

    #[test]
    fn test_history_start_includes_backfill() {
        let habit = Habit::new("h", created()).with_completion(date(2023, 12, 20), 1);
        assert_eq!(habit.history_start(), date(2023, 12, 20));
        assert_eq!(Habit::new("h", created()).history_start(), date(2024, 1, 1));
    }

    #[test]
    fn test_validate() {
        assert!(Habit::new("h", created()).validate().is_ok());
        assert!(Habit::new("h", created()).with_daily_target(0).validate().is_err());
        assert!(Habit::new("h", created()).with_selected_days([7]).validate().is_err());
    }

    #[test]
    fn test_vacation_coverage() {
        let closed = VacationInterval::closed(date(2024, 2, 1), date(2024, 2, 5));
        assert!(closed.covers(date(2024, 2, 1), false));
        assert!(closed.covers(date(2024, 2, 5), false));
        assert!(!closed.covers(date(2024, 2, 6), true));

        let open = VacationInterval::open(date(2024, 2, 10));
        assert!(!open.covers(date(2024, 2, 12), false));
        assert!(open.covers(date(2024, 2, 12), true));
        assert!(!open.covers(date(2024, 2, 9), true));
    }

    #[test]
    fn test_habit_json_shape() {
        let json = r#"{
            "id": "read",
            "completions": {"2024-01-02": 1, "2024-01-03": 2},
            "selectedDays": [1, 2, 3],
            "createdAt": "2024-01-01T08:00:00Z"
        }"#;
        let habit: Habit = serde_json::from_str(json).unwrap();
        assert_eq!(habit.daily_target, 1);
        assert_eq!(habit.completions.get(&date(2024, 1, 3)), Some(&2));
        assert_eq!(habit.selected_days.len(), 3);
    }
}
