//! 变更检测
//!
//! 保存上一次重算时的输入快照，与当前输入逐个习惯比较，
//! 只有结构上发生变化的习惯才需要重算。

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{Habit, VacationState};

/// 重算输入快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    habits: BTreeMap<String, Habit>,
    vacations: VacationState,
    day: NaiveDate,
}

/// 两次快照之间的差异
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// 新增或变化的习惯
    pub changed: Vec<String>,
    /// 已被删除的习惯
    pub removed: Vec<String>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.removed.is_empty()
    }
}

impl Snapshot {
    pub fn capture(habits: &[Habit], vacations: &VacationState, day: NaiveDate) -> Self {
        Self {
            habits: habits.iter().map(|h| (h.id.clone(), h.clone())).collect(),
            vacations: vacations.clone(),
            day,
        }
    }

    pub fn habit(&self, habit_id: &str) -> Option<&Habit> {
        self.habits.get(habit_id)
    }

    pub fn habit_ids(&self) -> impl Iterator<Item = &str> {
        self.habits.keys().map(String::as_str)
    }

    /// 与上一次快照比较
    ///
    /// 假期状态或日期变化会影响所有习惯
    pub fn diff(&self, previous: Option<&Snapshot>) -> SnapshotDiff {
        let Some(previous) = previous else {
            return SnapshotDiff {
                changed: self.habits.keys().cloned().collect(),
                removed: Vec::new(),
            };
        };

        let global_change = previous.vacations != self.vacations || previous.day != self.day;

        let changed = self
            .habits
            .iter()
            .filter(|(id, habit)| global_change || previous.habits.get(*id) != Some(*habit))
            .map(|(id, _)| id.clone())
            .collect();
        let removed = previous
            .habits
            .keys()
            .filter(|id| !self.habits.contains_key(*id))
            .cloned()
            .collect();

        SnapshotDiff { changed, removed }
    }
}
