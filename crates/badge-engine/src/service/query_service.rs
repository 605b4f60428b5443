//! 徽章查询服务
//!
//! 将目录与持久化的进度、解锁状态合并为展示视图。

use std::collections::HashMap;
use std::sync::Arc;

use tracing::instrument;

use crate::catalog::BadgeCatalog;
use crate::error::Result;
use crate::models::BadgeView;
use crate::repository::{BadgeProgressRepositoryTrait, UserBadgeRepositoryTrait};

/// 徽章查询服务（只读）
pub struct BadgeQueryService {
    catalog: Arc<BadgeCatalog>,
    unlock_repo: Arc<dyn UserBadgeRepositoryTrait>,
    progress_repo: Arc<dyn BadgeProgressRepositoryTrait>,
}

impl BadgeQueryService {
    pub fn new(
        catalog: Arc<BadgeCatalog>,
        unlock_repo: Arc<dyn UserBadgeRepositoryTrait>,
        progress_repo: Arc<dyn BadgeProgressRepositoryTrait>,
    ) -> Self {
        Self {
            catalog,
            unlock_repo,
            progress_repo,
        }
    }

    /// 全部徽章视图
    ///
    /// 按目录顺序，每个徽章恰好出现一次；没有持久化记录的徽章使用默认状态。
    /// 目录外的持久化记录不出现在结果中。
    #[instrument(skip(self))]
    pub async fn get_badges(&self) -> Result<Vec<BadgeView>> {
        let unlocks: HashMap<String, _> = self
            .unlock_repo
            .list_unlocks()
            .await?
            .into_iter()
            .map(|u| (u.badge_id.clone(), u))
            .collect();
        let progress: HashMap<String, i64> = self
            .progress_repo
            .list_progress()
            .await?
            .into_iter()
            .map(|p| (p.badge_id, p.current_value))
            .collect();

        let views = self
            .catalog
            .iter()
            .map(|badge| {
                let unlock = unlocks.get(&badge.id);
                BadgeView {
                    progress: progress.get(&badge.id).copied().unwrap_or(0),
                    target: badge.requirement.threshold(),
                    is_unlocked: unlock.is_some(),
                    is_seen: unlock.is_some_and(|u| u.is_seen),
                    unlocked_at: unlock.map(|u| u.unlocked_at),
                    badge: badge.clone(),
                }
            })
            .collect();

        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin;
    use crate::models::{BadgeProgress, BadgeUnlock, UnlockSource};
    use crate::repository::MemoryBadgeStore;

    #[tokio::test]
    async fn test_defaults_for_empty_store() {
        let store = Arc::new(MemoryBadgeStore::new());
        let catalog = Arc::new(BadgeCatalog::builtin());
        let service = BadgeQueryService::new(catalog.clone(), store.clone(), store);

        let views = service.get_badges().await.unwrap();
        assert_eq!(views.len(), catalog.len());
        assert!(views
            .iter()
            .all(|v| v.progress == 0 && !v.is_unlocked && !v.is_seen && v.unlocked_at.is_none()));
    }

    #[tokio::test]
    async fn test_merges_persisted_state() {
        let store = Arc::new(MemoryBadgeStore::new());
        store
            .insert_unlock(&BadgeUnlock::new(builtin::VOL_1, UnlockSource::Rule))
            .await
            .unwrap();
        store
            .upsert_progress(&BadgeProgress::new(builtin::TIME_MORNING_5, 3))
            .await
            .unwrap();
        // 目录外的记录不应出现在结果中
        store
            .upsert_progress(&BadgeProgress::new("retired_badge", 9))
            .await
            .unwrap();

        let catalog = Arc::new(BadgeCatalog::builtin());
        let service = BadgeQueryService::new(catalog.clone(), store.clone(), store);
        let views = service.get_badges().await.unwrap();
        assert_eq!(views.len(), catalog.len());

        let first = views.iter().find(|v| v.badge.id == builtin::VOL_1).unwrap();
        assert!(first.is_unlocked);
        assert!(!first.is_seen);
        assert!(first.unlocked_at.is_some());

        let morning = views
            .iter()
            .find(|v| v.badge.id == builtin::TIME_MORNING_5)
            .unwrap();
        assert_eq!(morning.progress, 3);
        assert_eq!(morning.target, 5);
        assert!(!morning.is_unlocked);
    }
}
