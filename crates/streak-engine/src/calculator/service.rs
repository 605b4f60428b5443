//! 连续打卡重算服务
//!
//! ## 触发流程
//!
//! `Idle → Recalculating → (逐个习惯) EvaluatingBadges → Notifying → Idle`
//!
//! - 首次触发前必须调用 `mark_hydrated`，否则返回 `NotHydrated`
//! - 同一时间只有一次重算在执行，后到的触发排队等待
//! - 输入快照无变化时 `update_streaks` 直接跳过；`force_recalculate` 不做检查
//! - 单个习惯失败只记录日志，不影响其余习惯；失败的习惯下次触发时重试，
//!   其快照条目照常保存，当天的完成不会被再次视为新增

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, watch};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use badge_engine::{BadgeDefinition, EventContext, EventType};
use badge_shared::observability::metrics;

use super::algorithm;
use super::snapshot::Snapshot;
use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StreakError};
use crate::evaluator::UnlockEvaluator;
use crate::models::{Habit, HabitFailure, RecalculationOutcome, StreakState, VacationState};
use crate::notifier::{Subscription, UnlockNotifier};
use crate::source::{HabitSource, VacationSource};

/// 触发流程所处阶段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerPhase {
    #[default]
    Idle,
    Recalculating,
    EvaluatingBadges,
    Notifying,
}

/// 阶段守卫，drop 时回到 `Idle`
struct PhaseGuard<'a> {
    phase: &'a Mutex<TriggerPhase>,
}

impl<'a> PhaseGuard<'a> {
    fn enter(phase: &'a Mutex<TriggerPhase>, initial: TriggerPhase) -> Self {
        *phase.lock() = initial;
        Self { phase }
    }

    fn set(&self, next: TriggerPhase) {
        *self.phase.lock() = next;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *self.phase.lock() = TriggerPhase::Idle;
    }
}

/// 今天的完成是否为新增
///
/// 首次重算作为基线，不计为新增
fn completed_today_is_new(habit: &Habit, previous: Option<&Snapshot>, today: NaiveDate) -> bool {
    if !habit.is_completed_on(today) {
        return false;
    }
    match previous {
        None => false,
        Some(snapshot) => snapshot
            .habit(&habit.id)
            .is_none_or(|before| !before.is_completed_on(today)),
    }
}

/// 连续打卡重算服务
pub struct StreakCalculator {
    habits: Arc<dyn HabitSource>,
    vacations: Arc<dyn VacationSource>,
    evaluator: Arc<dyn UnlockEvaluator>,
    clock: Arc<dyn Clock>,
    notifier: UnlockNotifier,
    states: RwLock<BTreeMap<String, StreakState>>,
    /// 上一次重算的输入快照，同时串行化重算
    snapshot: AsyncMutex<Option<Snapshot>>,
    /// 上一次重算失败、下次触发必须重算的习惯
    pending_retry: Mutex<HashSet<String>>,
    hydrated: watch::Sender<bool>,
    phase: Mutex<TriggerPhase>,
}

impl StreakCalculator {
    pub fn new(
        habits: Arc<dyn HabitSource>,
        vacations: Arc<dyn VacationSource>,
        evaluator: Arc<dyn UnlockEvaluator>,
    ) -> Self {
        let (hydrated, _) = watch::channel(false);
        Self {
            habits,
            vacations,
            evaluator,
            clock: Arc::new(SystemClock),
            notifier: UnlockNotifier::new(),
            states: RwLock::new(BTreeMap::new()),
            snapshot: AsyncMutex::new(None),
            pending_retry: Mutex::new(HashSet::new()),
            hydrated,
            phase: Mutex::new(TriggerPhase::Idle),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // ==================== 初始化 ====================

    /// 标记数据已加载完成，之后才接受触发
    pub fn mark_hydrated(&self) {
        if !self.hydrated.send_replace(true) {
            info!("习惯数据加载完成，开始接受重算触发");
        }
    }

    pub fn is_hydrated(&self) -> bool {
        *self.hydrated.borrow()
    }

    /// 等待数据加载完成
    pub async fn wait_until_hydrated(&self) -> Result<()> {
        let mut rx = self.hydrated.subscribe();
        rx.wait_for(|hydrated| *hydrated)
            .await
            .map_err(|e| StreakError::Internal(e.to_string()))?;
        Ok(())
    }

    // ==================== 对外接口 ====================

    /// 输入有变化时重算
    pub async fn update_streaks(&self) -> Result<RecalculationOutcome> {
        self.run(false).await
    }

    /// 跳过变更检测，重算全部习惯
    pub async fn force_recalculate(&self) -> Result<RecalculationOutcome> {
        self.run(true).await
    }

    /// 最近一次计算的状态（按习惯 ID 排序），不触发重算
    pub fn get_current_stats(&self) -> Vec<StreakState> {
        self.states.read().values().cloned().collect()
    }

    pub fn stats_for(&self, habit_id: &str) -> Option<StreakState> {
        self.states.read().get(habit_id).cloned()
    }

    /// 订阅重算产生的新解锁徽章
    pub fn on_badge_unlock<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[BadgeDefinition]) + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }

    pub fn phase(&self) -> TriggerPhase {
        *self.phase.lock()
    }

    // ==================== 重算流程 ====================

    #[instrument(skip(self))]
    async fn run(&self, forced: bool) -> Result<RecalculationOutcome> {
        if !self.is_hydrated() {
            return Err(StreakError::NotHydrated);
        }

        let mut last_snapshot = self.snapshot.lock().await;
        let run_id = Uuid::now_v7().to_string();
        let start = Instant::now();
        let phase = PhaseGuard::enter(&self.phase, TriggerPhase::Recalculating);

        let habits = self.habits.load_habits().await?;
        let vacations = self.vacations.load_vacations().await?;
        let now = self.clock.now();
        let today = now.date_naive();

        let current = Snapshot::capture(&habits, &vacations, today);
        let diff = current.diff(last_snapshot.as_ref());
        let retry = std::mem::take(&mut *self.pending_retry.lock());

        if !forced && diff.is_empty() && retry.is_empty() {
            debug!(run_id = %run_id, "输入无变化，跳过重算");
            return Ok(RecalculationOutcome {
                run_id,
                skipped: true,
                ..Default::default()
            });
        }

        let targets: Vec<&Habit> = habits
            .iter()
            .filter(|habit| {
                forced || diff.changed.contains(&habit.id) || retry.contains(&habit.id)
            })
            .collect();
        let total: u64 = habits.iter().map(Habit::total_completions).sum();
        let total_completions = i64::try_from(total).unwrap_or(i64::MAX);

        info!(
            run_id = %run_id,
            forced = forced,
            habit_count = targets.len(),
            retry_count = retry.len(),
            "开始重算连续打卡"
        );

        let mut outcome = RecalculationOutcome {
            run_id: run_id.clone(),
            ..Default::default()
        };
        let mut unlocked: Vec<BadgeDefinition> = Vec::new();

        for habit in targets {
            phase.set(TriggerPhase::Recalculating);
            let result = self
                .recalculate_habit(
                    habit,
                    &vacations,
                    now,
                    total_completions,
                    last_snapshot.as_ref(),
                    &phase,
                )
                .await;

            match result {
                Ok(badges) => {
                    outcome.recalculated.push(habit.id.clone());
                    unlocked.extend(badges);
                }
                Err(e) => {
                    warn!(
                        run_id = %run_id,
                        habit_id = %habit.id,
                        error = %e,
                        "习惯重算失败，继续处理其余习惯"
                    );
                    self.pending_retry.lock().insert(habit.id.clone());
                    outcome.failed.push(HabitFailure {
                        habit_id: habit.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if !diff.removed.is_empty() {
            let mut states = self.states.write();
            for habit_id in &diff.removed {
                states.remove(habit_id);
            }
        }

        if !unlocked.is_empty() {
            phase.set(TriggerPhase::Notifying);
            let notified = self.notifier.notify(&unlocked);
            debug!(run_id = %run_id, subscriber_count = notified, "已通知订阅者");
        }

        outcome.unlocked = unlocked.into_iter().map(|b| b.id).collect();
        *last_snapshot = Some(current);

        metrics::record_streak_recalculation(
            forced,
            outcome.recalculated.len() + outcome.failed.len(),
            outcome.failed.len(),
            start.elapsed().as_secs_f64(),
        );
        info!(
            run_id = %run_id,
            recalculated = outcome.recalculated.len(),
            failed = outcome.failed.len(),
            unlocked = outcome.unlocked.len(),
            "连续打卡重算完成"
        );

        Ok(outcome)
    }

    async fn recalculate_habit(
        &self,
        habit: &Habit,
        vacations: &VacationState,
        now: DateTime<FixedOffset>,
        total_completions: i64,
        previous: Option<&Snapshot>,
        phase: &PhaseGuard<'_>,
    ) -> Result<Vec<BadgeDefinition>> {
        habit
            .validate()
            .map_err(|reason| StreakError::InvalidHabit {
                habit_id: habit.id.clone(),
                reason,
            })?;

        let today = now.date_naive();
        let previous_longest = self
            .states
            .read()
            .get(&habit.id)
            .map_or(0, |s| s.longest_streak);
        let state = algorithm::build_state(
            habit,
            vacations,
            today,
            previous_longest,
            now.with_timezone(&Utc),
        );
        let streak = i64::from(state.current_streak);
        debug!(
            habit_id = %habit.id,
            current_streak = state.current_streak,
            longest_streak = state.longest_streak,
            "习惯状态已更新"
        );
        self.states.write().insert(habit.id.clone(), state);

        phase.set(TriggerPhase::EvaluatingBadges);
        let mut context = EventContext::new()
            .with_streak(streak)
            .with_total_completions(total_completions);
        if completed_today_is_new(habit, previous, today) {
            context = context.with_timestamp(now);
        }

        let badges = self
            .evaluator
            .check_unlock(EventType::HabitComplete, &context)
            .await?;
        Ok(badges)
    }
}
