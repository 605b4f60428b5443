//! 徽章判定流程集成测试
//!
//! 使用内存存储后端跑通完整的判定、计数与账本流程，无需外部依赖

use std::sync::Arc;

use badge_engine::catalog::builtin;
use badge_engine::{
    BadgeCatalog, BadgeCategory, BadgeDefinition, BadgeEngine, BadgeRequirement, EventContext,
    EventType, MemoryBadgeStore, TimeWindow, UserBadgeRepositoryTrait, is_relevant_event,
};
use chrono::{DateTime, FixedOffset, TimeZone};

// ==================== 辅助函数 ====================

fn engine() -> BadgeEngine {
    BadgeEngine::in_memory(BadgeCatalog::builtin())
}

fn local(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(-5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 6, day, hour, minute, 0)
        .unwrap()
}

fn ids(badges: &[BadgeDefinition]) -> Vec<&str> {
    badges.iter().map(|b| b.id.as_str()).collect()
}

fn badge_with_kind(requirement: BadgeRequirement) -> BadgeDefinition {
    BadgeDefinition::new("probe", "Probe", "probe", BadgeCategory::Volume, requirement)
}

async fn progress_of(engine: &BadgeEngine, badge_id: &str) -> i64 {
    engine
        .get_badges()
        .await
        .unwrap()
        .into_iter()
        .find(|v| v.badge.id == badge_id)
        .map(|v| v.progress)
        .unwrap()
}

// ==================== 基本场景 ====================

#[tokio::test]
async fn test_first_completion_unlocks_first_step() {
    let engine = engine();
    let unlocked = engine
        .check_unlock(
            EventType::HabitComplete,
            &EventContext::new().with_total_completions(1),
        )
        .await
        .unwrap();

    assert_eq!(ids(&unlocked), vec![builtin::VOL_1]);
    assert_eq!(unlocked[0].title, "First Step");
}

#[tokio::test]
async fn test_week_warrior_threshold_is_inclusive() {
    let engine = engine();

    let below = engine
        .check_unlock(EventType::HabitComplete, &EventContext::new().with_streak(6))
        .await
        .unwrap();
    assert!(!ids(&below).contains(&builtin::STREAK_7));

    let at = engine
        .check_unlock(EventType::HabitComplete, &EventContext::new().with_streak(7))
        .await
        .unwrap();
    let week = at.iter().find(|b| b.id == builtin::STREAK_7).unwrap();
    assert_eq!(week.title, "Week Warrior");
    assert_eq!(week.requirement.threshold(), 7);
}

#[tokio::test]
async fn test_morning_window_accumulates_to_unlock() {
    let engine = engine();

    for day in 1..=4 {
        let unlocked = engine
            .check_unlock(
                EventType::HabitComplete,
                &EventContext::new().with_timestamp(local(day, 5, 30)),
            )
            .await
            .unwrap();
        assert!(unlocked.is_empty());
        assert_eq!(progress_of(&engine, builtin::TIME_MORNING_5).await, day as i64);
    }

    let fifth = engine
        .check_unlock(
            EventType::HabitComplete,
            &EventContext::new().with_timestamp(local(5, 5, 30)),
        )
        .await
        .unwrap();
    assert_eq!(ids(&fifth), vec![builtin::TIME_MORNING_5]);
    assert_eq!(progress_of(&engine, builtin::TIME_MORNING_5).await, 5);
}

#[tokio::test]
async fn test_window_end_hour_is_exclusive() {
    let engine = engine();
    engine
        .check_unlock(
            EventType::HabitComplete,
            &EventContext::new().with_timestamp(local(1, 9, 0)),
        )
        .await
        .unwrap();

    assert_eq!(progress_of(&engine, builtin::TIME_MORNING_5).await, 0);
}

#[tokio::test]
async fn test_repeat_call_does_not_unlock_again() {
    let engine = engine();
    let ctx = EventContext::new().with_total_completions(1);

    let first = engine.check_unlock(EventType::HabitComplete, &ctx).await.unwrap();
    let second = engine.check_unlock(EventType::HabitComplete, &ctx).await.unwrap();

    assert_eq!(ids(&first), vec![builtin::VOL_1]);
    assert!(second.is_empty());
}

#[test]
fn test_relevant_event_mapping() {
    let streak = badge_with_kind(BadgeRequirement::StreakDays { threshold: 3 });
    let created = badge_with_kind(BadgeRequirement::HabitsCreated { threshold: 1 });
    let window = badge_with_kind(BadgeRequirement::TimeWindowCompletions {
        threshold: 1,
        window: TimeWindow::new(5, 9),
    });

    assert!(is_relevant_event(&streak, EventType::HabitComplete));
    assert!(!is_relevant_event(&created, EventType::HabitComplete));
    assert!(is_relevant_event(&created, EventType::HabitCreate));
    assert!(is_relevant_event(&window, EventType::HabitComplete));
}

// ==================== 性质 ====================

#[tokio::test]
async fn test_threshold_badge_returned_exactly_once() {
    let engine = engine();
    let mut seen = 0;

    for streak in [0, 2, 3, 1, 10, 3, 100] {
        let unlocked = engine
            .check_unlock(EventType::HabitComplete, &EventContext::new().with_streak(streak))
            .await
            .unwrap();
        let hit = unlocked.iter().any(|b| b.id == builtin::STREAK_3);
        if hit {
            // 第一次满足阈值的调用返回该徽章
            assert!(streak >= 3 && seen == 0);
            seen += 1;
        }
    }

    assert_eq!(seen, 1);
}

#[tokio::test]
async fn test_larger_context_unlocks_all_lower_tiers_once() {
    let engine = engine();
    let ctx = EventContext::new().with_total_completions(60);

    let unlocked = engine.check_unlock(EventType::HabitComplete, &ctx).await.unwrap();
    assert_eq!(
        ids(&unlocked),
        vec![builtin::VOL_1, builtin::VOL_10, builtin::VOL_50]
    );

    let again = engine
        .check_unlock(
            EventType::HabitComplete,
            &EventContext::new().with_total_completions(100),
        )
        .await
        .unwrap();
    assert_eq!(ids(&again), vec![builtin::VOL_100]);
}

#[tokio::test]
async fn test_get_badges_covers_catalog() {
    let engine = engine();
    assert_eq!(engine.get_badges().await.unwrap().len(), engine.catalog().len());

    engine
        .check_unlock(
            EventType::HabitComplete,
            &EventContext::new().with_total_completions(10).with_streak(3),
        )
        .await
        .unwrap();
    engine.unlock_badge(builtin::HABIT_5).await.unwrap();

    let views = engine.get_badges().await.unwrap();
    assert_eq!(views.len(), engine.catalog().len());
    assert_eq!(views.iter().filter(|v| v.is_unlocked).count(), 4);
}

#[tokio::test]
async fn test_sequential_increments() {
    let engine = engine();
    for expected in 1..=10 {
        assert_eq!(
            engine.increment_progress(builtin::VOL_500).await.unwrap(),
            expected
        );
    }
}

#[tokio::test]
async fn test_counter_untouched_outside_window() {
    let engine = engine();
    engine
        .check_unlock(
            EventType::HabitComplete,
            &EventContext::new().with_timestamp(local(1, 6, 0)),
        )
        .await
        .unwrap();
    for hour in [9, 12, 21, 4] {
        engine
            .check_unlock(
                EventType::HabitComplete,
                &EventContext::new().with_timestamp(local(2, hour, 15)),
            )
            .await
            .unwrap();
    }

    assert_eq!(progress_of(&engine, builtin::TIME_MORNING_5).await, 1);
}

#[tokio::test]
async fn test_progress_update_does_not_unlock() {
    let engine = engine();
    engine.update_progress(builtin::VOL_10, 10).await.unwrap();

    let views = engine.get_badges().await.unwrap();
    let vol_10 = views.iter().find(|v| v.badge.id == builtin::VOL_10).unwrap();
    assert_eq!(vol_10.progress, 10);
    assert!(!vol_10.is_unlocked);
}

#[tokio::test]
async fn test_mark_as_seen_flow() {
    let engine = engine();
    engine
        .check_unlock(
            EventType::HabitComplete,
            &EventContext::new().with_total_completions(1),
        )
        .await
        .unwrap();
    assert_eq!(ids(&engine.unseen_unlocks().await.unwrap()), vec![builtin::VOL_1]);

    let batch = vec![builtin::VOL_1.to_string(), "unknown".to_string()];
    engine.mark_as_seen(&batch).await.unwrap();
    engine.mark_as_seen(&batch).await.unwrap();

    assert!(engine.unseen_unlocks().await.unwrap().is_empty());
    let views = engine.get_badges().await.unwrap();
    let first = views.iter().find(|v| v.badge.id == builtin::VOL_1).unwrap();
    assert!(first.is_unlocked && first.is_seen);
}

#[tokio::test]
async fn test_manual_unlock_keeps_first_timestamp() {
    let store = Arc::new(MemoryBadgeStore::new());
    let engine = BadgeEngine::new(BadgeCatalog::builtin(), store.clone(), store.clone());

    engine
        .check_unlock(EventType::HabitComplete, &EventContext::new().with_streak(3))
        .await
        .unwrap();
    let original = store.get_unlock(builtin::STREAK_3).await.unwrap().unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    assert!(!engine.unlock_badge(builtin::STREAK_3).await.unwrap());

    let after = store.get_unlock(builtin::STREAK_3).await.unwrap().unwrap();
    assert_eq!(after.unlocked_at, original.unlocked_at);
}

#[tokio::test]
async fn test_concurrent_checks_unlock_once() {
    let engine = Arc::new(engine());
    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .check_unlock(
                    EventType::HabitComplete,
                    &EventContext::new().with_total_completions(1),
                )
                .await
                .unwrap()
                .len()
        }));
    }

    let mut total = 0;
    for handle in handles {
        total += handle.await.unwrap();
    }
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_custom_catalog_from_json() {
    let json = r#"[
        {"id": "owl", "title": "Owl", "description": "late",
         "category": "timing",
         "requirement": {"kind": "time_window_completions", "threshold": 2,
                         "window": {"startHour": 23, "endHour": 1}}}
    ]"#;
    let engine = BadgeEngine::in_memory(BadgeCatalog::from_json(json).unwrap());

    let first = engine
        .check_unlock(
            EventType::HabitComplete,
            &EventContext::new().with_timestamp(local(1, 23, 10)),
        )
        .await
        .unwrap();
    assert!(first.is_empty());

    let second = engine
        .check_unlock(
            EventType::HabitComplete,
            &EventContext::new().with_timestamp(local(2, 0, 45)),
        )
        .await
        .unwrap();
    assert_eq!(ids(&second), vec!["owl"]);
}
