//! 外部协作方接口
//!
//! 习惯存储与假期存储对本引擎只读。内存实现供测试与 `streak-worker`
//! 使用，可从 JSON 文件加载初始数据。

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::info;

use crate::error::{Result, StreakError};
use crate::models::{Habit, VacationInterval, VacationState};

/// 习惯数据源
#[async_trait]
pub trait HabitSource: Send + Sync {
    async fn load_habits(&self) -> Result<Vec<Habit>>;
}

/// 假期数据源
#[async_trait]
pub trait VacationSource: Send + Sync {
    async fn load_vacations(&self) -> Result<VacationState>;
}

/// 内存习惯存储
#[derive(Debug, Default)]
pub struct InMemoryHabitSource {
    habits: RwLock<BTreeMap<String, Habit>>,
}

impl InMemoryHabitSource {
    pub fn new(habits: Vec<Habit>) -> Self {
        Self {
            habits: RwLock::new(habits.into_iter().map(|h| (h.id.clone(), h)).collect()),
        }
    }

    /// 从 JSON 数组文件加载
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let habits: Vec<Habit> = serde_json::from_str(&content)?;
        info!(path = %path.display(), habit_count = habits.len(), "习惯数据已加载");
        Ok(Self::new(habits))
    }

    pub fn upsert_habit(&self, habit: Habit) {
        self.habits.write().insert(habit.id.clone(), habit);
    }

    pub fn remove_habit(&self, habit_id: &str) -> Option<Habit> {
        self.habits.write().remove(habit_id)
    }

    /// 设置某天的完成次数，次数为 0 时删除该记录
    pub fn set_completion(&self, habit_id: &str, date: NaiveDate, count: u32) -> Result<()> {
        let mut habits = self.habits.write();
        let habit = habits
            .get_mut(habit_id)
            .ok_or_else(|| StreakError::Source(format!("习惯不存在: {}", habit_id)))?;
        if count == 0 {
            habit.completions.remove(&date);
        } else {
            habit.completions.insert(date, count);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.habits.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.read().is_empty()
    }
}

#[async_trait]
impl HabitSource for InMemoryHabitSource {
    async fn load_habits(&self) -> Result<Vec<Habit>> {
        Ok(self.habits.read().values().cloned().collect())
    }
}

/// 内存假期存储
#[derive(Debug, Default)]
pub struct InMemoryVacationSource {
    state: RwLock<VacationState>,
}

impl InMemoryVacationSource {
    pub fn new(state: VacationState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// 从 JSON 文件加载
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let state: VacationState = serde_json::from_str(&content)?;
        info!(
            path = %path.display(),
            interval_count = state.intervals.len(),
            active = state.active,
            "假期数据已加载"
        );
        Ok(Self::new(state))
    }

    pub fn set_active(&self, active: bool) {
        self.state.write().active = active;
    }

    pub fn add_interval(&self, interval: VacationInterval) {
        let mut state = self.state.write();
        state.intervals.push(interval);
        state.intervals.sort_by_key(|i| i.start_date);
    }

    /// 结束开放式区间
    pub fn close_open_intervals(&self, end_date: NaiveDate) {
        let mut state = self.state.write();
        for interval in state.intervals.iter_mut().filter(|i| i.end_date.is_none()) {
            interval.end_date = Some(end_date);
        }
    }
}

#[async_trait]
impl VacationSource for InMemoryVacationSource {
    async fn load_vacations(&self) -> Result<VacationState> {
        Ok(self.state.read().clone())
    }
}
