//! 内存存储后端
//!
//! 使用 DashMap 实现，适用于测试、开发环境以及不需要持久化的单机运行。
//! 所有写入都在单个 entry 锁内完成，天然避免同一 key 的丢失更新。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::traits::{BadgeProgressRepositoryTrait, UserBadgeRepositoryTrait};
use crate::error::Result;
use crate::models::{BadgeProgress, BadgeUnlock};

/// 内存徽章存储
///
/// 同时实现解锁账本与进度计数两个仓储接口；克隆后共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct MemoryBadgeStore {
    unlocks: Arc<DashMap<String, BadgeUnlock>>,
    progress: Arc<DashMap<String, BadgeProgress>>,
}

impl MemoryBadgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解锁记录数量
    pub fn unlock_count(&self) -> usize {
        self.unlocks.len()
    }

    /// 清空所有数据
    pub fn clear(&self) {
        self.unlocks.clear();
        self.progress.clear();
    }
}

#[async_trait]
impl UserBadgeRepositoryTrait for MemoryBadgeStore {
    async fn list_unlocks(&self) -> Result<Vec<BadgeUnlock>> {
        let mut unlocks: Vec<BadgeUnlock> = self
            .unlocks
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        unlocks.sort_by(|a, b| a.unlocked_at.cmp(&b.unlocked_at));
        Ok(unlocks)
    }

    async fn get_unlock(&self, badge_id: &str) -> Result<Option<BadgeUnlock>> {
        Ok(self.unlocks.get(badge_id).map(|v| v.clone()))
    }

    async fn insert_unlock(&self, unlock: &BadgeUnlock) -> Result<bool> {
        match self.unlocks.entry(unlock.badge_id.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(unlock.clone());
                Ok(true)
            }
        }
    }

    async fn mark_seen(&self, badge_ids: &[String]) -> Result<u64> {
        let mut affected = 0;
        for badge_id in badge_ids {
            if let Some(mut unlock) = self.unlocks.get_mut(badge_id)
                && !unlock.is_seen
            {
                unlock.is_seen = true;
                affected += 1;
            }
        }
        Ok(affected)
    }
}

#[async_trait]
impl BadgeProgressRepositoryTrait for MemoryBadgeStore {
    async fn list_progress(&self) -> Result<Vec<BadgeProgress>> {
        Ok(self
            .progress
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn get_progress(&self, badge_id: &str) -> Result<Option<BadgeProgress>> {
        Ok(self.progress.get(badge_id).map(|v| v.clone()))
    }

    async fn upsert_progress(&self, progress: &BadgeProgress) -> Result<()> {
        self.progress
            .insert(progress.badge_id.clone(), progress.clone());
        Ok(())
    }

    async fn increment_progress(&self, badge_id: &str, at: DateTime<Utc>) -> Result<i64> {
        let mut entry = self
            .progress
            .entry(badge_id.to_string())
            .or_insert_with(|| BadgeProgress {
                badge_id: badge_id.to_string(),
                current_value: 0,
                meta: None,
                last_updated: at,
            });
        entry.current_value += 1;
        entry.last_updated = at;
        Ok(entry.current_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnlockSource;

    #[tokio::test]
    async fn test_insert_unlock_once() {
        let store = MemoryBadgeStore::new();
        let first = BadgeUnlock::new("vol_1", UnlockSource::Rule);
        let original_time = first.unlocked_at;

        assert!(store.insert_unlock(&first).await.unwrap());

        let mut second = BadgeUnlock::new("vol_1", UnlockSource::Manual);
        second.unlocked_at = original_time + chrono::Duration::hours(1);
        assert!(!store.insert_unlock(&second).await.unwrap());

        let stored = store.get_unlock("vol_1").await.unwrap().unwrap();
        assert_eq!(stored.unlocked_at, original_time);
        assert_eq!(stored.source, UnlockSource::Rule);
        assert_eq!(store.unlock_count(), 1);
    }

    #[tokio::test]
    async fn test_mark_seen_counts_changes_only() {
        let store = MemoryBadgeStore::new();
        store
            .insert_unlock(&BadgeUnlock::new("vol_1", UnlockSource::Rule))
            .await
            .unwrap();

        let ids = vec!["vol_1".to_string(), "ghost".to_string()];
        assert_eq!(store.mark_seen(&ids).await.unwrap(), 1);
        assert_eq!(store.mark_seen(&ids).await.unwrap(), 0);
        assert!(store.get_unlock("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_increment_sequence() {
        let store = MemoryBadgeStore::new();
        let now = Utc::now();
        for expected in 1..=4 {
            let value = store.increment_progress("time_morning_5", now).await.unwrap();
            assert_eq!(value, expected);
        }
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let store = MemoryBadgeStore::new();
        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.increment_progress("vol_x", Utc::now()).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let progress = store.get_progress("vol_x").await.unwrap().unwrap();
        assert_eq!(progress.current_value, 32);
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let store = MemoryBadgeStore::new();
        store.upsert_progress(&BadgeProgress::new("vol_10", 4)).await.unwrap();
        store.upsert_progress(&BadgeProgress::new("vol_10", 2)).await.unwrap();

        let progress = store.list_progress().await.unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].current_value, 2);
    }
}
