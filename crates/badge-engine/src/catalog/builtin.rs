//! 内置徽章目录
//!
//! 徽章 ID 使用 snake_case 字符串，跨版本保持稳定。

use crate::models::{BadgeCategory, BadgeDefinition, BadgeRequirement, TimeWindow};

pub const VOL_1: &str = "vol_1";
pub const VOL_10: &str = "vol_10";
pub const VOL_50: &str = "vol_50";
pub const VOL_100: &str = "vol_100";
pub const VOL_500: &str = "vol_500";
pub const STREAK_3: &str = "streak_3";
pub const STREAK_7: &str = "streak_7";
pub const STREAK_14: &str = "streak_14";
pub const STREAK_30: &str = "streak_30";
pub const STREAK_100: &str = "streak_100";
pub const HABIT_FIRST: &str = "habit_first";
pub const HABIT_5: &str = "habit_5";
pub const TIME_MORNING_5: &str = "time_morning_5";
pub const TIME_NIGHT_5: &str = "time_night_5";

fn volume(id: &str, title: &str, description: &str, threshold: i64) -> BadgeDefinition {
    BadgeDefinition::new(
        id,
        title,
        description,
        BadgeCategory::Volume,
        BadgeRequirement::TotalCompletions { threshold },
    )
}

fn streak(id: &str, title: &str, description: &str, threshold: i64) -> BadgeDefinition {
    BadgeDefinition::new(
        id,
        title,
        description,
        BadgeCategory::Streak,
        BadgeRequirement::StreakDays { threshold },
    )
}

fn creation(id: &str, title: &str, description: &str, threshold: i64) -> BadgeDefinition {
    BadgeDefinition::new(
        id,
        title,
        description,
        BadgeCategory::Creation,
        BadgeRequirement::HabitsCreated { threshold },
    )
}

fn timing(
    id: &str,
    title: &str,
    description: &str,
    threshold: i64,
    window: TimeWindow,
) -> BadgeDefinition {
    BadgeDefinition::new(
        id,
        title,
        description,
        BadgeCategory::Timing,
        BadgeRequirement::TimeWindowCompletions { threshold, window },
    )
}

/// 内置目录的全部徽章定义
pub fn definitions() -> Vec<BadgeDefinition> {
    vec![
        volume(VOL_1, "First Step", "Complete a habit for the first time.", 1),
        volume(VOL_10, "Getting Started", "Complete habits 10 times.", 10),
        volume(VOL_50, "Committed", "Complete habits 50 times.", 50),
        volume(VOL_100, "Centurion", "Complete habits 100 times.", 100),
        volume(VOL_500, "Unstoppable", "Complete habits 500 times.", 500),
        streak(STREAK_3, "Warming Up", "Keep a 3 day streak.", 3),
        streak(STREAK_7, "Week Warrior", "Keep a 7 day streak.", 7),
        streak(STREAK_14, "Fortnight Focus", "Keep a 14 day streak.", 14),
        streak(STREAK_30, "Monthly Master", "Keep a 30 day streak.", 30),
        streak(STREAK_100, "Triple Digits", "Keep a 100 day streak.", 100),
        creation(HABIT_FIRST, "Fresh Start", "Create your first habit.", 1),
        creation(HABIT_5, "Habit Builder", "Create 5 habits.", 5),
        timing(
            TIME_MORNING_5,
            "Early Bird",
            "Complete a habit between 05:00 and 09:00 five times.",
            5,
            TimeWindow::new(5, 9),
        ),
        timing(
            TIME_NIGHT_5,
            "Night Owl",
            "Complete a habit between 22:00 and 02:00 five times.",
            5,
            TimeWindow::new(22, 2),
        ),
    ]
}
