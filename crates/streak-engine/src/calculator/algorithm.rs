//! 连续打卡计算
//!
//! 纯函数，从完整的完成历史与假期区间全量推导，不依赖上一次的结果
//! （历史最长值除外，它只增不减）。
//!
//! ## 规则
//!
//! - 只遍历计划内的日期，计划外的日期既不计数也不中断
//! - 达标的日期计数 +1
//! - 被假期覆盖的未完成日期不计数，但不中断
//! - 今天尚未完成不中断（今天还没结束）
//! - 其余未完成的计划日中断连续

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Habit, StreakState, VacationState};

/// 单日状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    Completed,
    Vacation,
    Missed,
    Unscheduled,
}

pub fn day_status(habit: &Habit, vacations: &VacationState, day: NaiveDate) -> DayStatus {
    if !habit.is_scheduled(day) {
        DayStatus::Unscheduled
    } else if habit.is_completed_on(day) {
        DayStatus::Completed
    } else if vacations.covers(day) {
        DayStatus::Vacation
    } else {
        DayStatus::Missed
    }
}

/// 计算结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakComputation {
    pub current: u32,
    /// 完成历史中出现过的最长连续
    pub longest: u32,
}

/// 从今天向前遍历计算当前连续，并正向扫描历史得到最长连续
pub fn compute_streak(
    habit: &Habit,
    vacations: &VacationState,
    today: NaiveDate,
) -> StreakComputation {
    let start = habit.history_start();

    let mut current = 0u32;
    let mut day = today;
    while day >= start {
        match day_status(habit, vacations, day) {
            DayStatus::Completed => current += 1,
            DayStatus::Vacation | DayStatus::Unscheduled => {}
            DayStatus::Missed if day == today => {}
            DayStatus::Missed => break,
        }
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }

    let mut run = 0u32;
    let mut longest = 0u32;
    for day in start.iter_days().take_while(|d| *d <= today) {
        match day_status(habit, vacations, day) {
            DayStatus::Completed => {
                run += 1;
                longest = longest.max(run);
            }
            DayStatus::Vacation | DayStatus::Unscheduled => {}
            DayStatus::Missed if day == today => {}
            DayStatus::Missed => run = 0,
        }
    }

    StreakComputation {
        current,
        longest: longest.max(current),
    }
}

/// 构建新的状态
///
/// `previous_longest` 为上次保存的最长值，保证最长值单调不减
pub fn build_state(
    habit: &Habit,
    vacations: &VacationState,
    today: NaiveDate,
    previous_longest: u32,
    calculated_at: DateTime<Utc>,
) -> StreakState {
    let computed = compute_streak(habit, vacations, today);

    StreakState {
        habit_id: habit.id.clone(),
        current_streak: computed.current,
        longest_streak: computed.longest.max(previous_longest),
        total_completions: habit.total_completions(),
        last_completed_on: habit.last_completed_on(),
        last_calculated: calculated_at,
    }
}
