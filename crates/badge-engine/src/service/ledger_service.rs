//! 解锁账本服务
//!
//! 解锁记录只追加：同一徽章重复解锁是空操作，不会重置 `unlocked_at`。

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use badge_shared::observability::metrics;

use crate::catalog::BadgeCatalog;
use crate::error::Result;
use crate::lock::LockManager;
use crate::models::{BadgeDefinition, BadgeUnlock, UnlockSource};
use crate::repository::UserBadgeRepositoryTrait;

fn lock_key(badge_id: &str) -> String {
    format!("unlock:{}", badge_id)
}

/// 解锁账本服务
pub struct LedgerService {
    catalog: Arc<BadgeCatalog>,
    unlock_repo: Arc<dyn UserBadgeRepositoryTrait>,
    locks: LockManager,
}

impl LedgerService {
    pub fn new(
        catalog: Arc<BadgeCatalog>,
        unlock_repo: Arc<dyn UserBadgeRepositoryTrait>,
        locks: LockManager,
    ) -> Self {
        Self {
            catalog,
            unlock_repo,
            locks,
        }
    }

    /// 已解锁的徽章 ID 集合
    pub async fn unlocked_ids(&self) -> Result<HashSet<String>> {
        let unlocks = self.unlock_repo.list_unlocks().await?;
        Ok(unlocks.into_iter().map(|u| u.badge_id).collect())
    }

    /// 写入解锁记录，返回是否为新解锁
    pub async fn record_unlock(&self, badge_id: &str, source: UnlockSource) -> Result<bool> {
        let _guard = self.locks.acquire(&lock_key(badge_id)).await;

        let inserted = self
            .unlock_repo
            .insert_unlock(&BadgeUnlock::new(badge_id, source))
            .await?;

        if inserted {
            metrics::record_badge_unlock(badge_id, source.as_str());
            info!(badge_id = %badge_id, source = source.as_str(), "徽章已解锁");
        } else {
            debug!(badge_id = %badge_id, "徽章已解锁过，跳过");
        }
        Ok(inserted)
    }

    /// 手动解锁（绕过规则判定）
    ///
    /// 目录外的 ID 返回 `false`
    #[instrument(skip(self))]
    pub async fn unlock_badge(&self, badge_id: &str) -> Result<bool> {
        if !self.catalog.contains(badge_id) {
            debug!(badge_id = %badge_id, "忽略目录外的手动解锁");
            return Ok(false);
        }
        self.record_unlock(badge_id, UnlockSource::Manual).await
    }

    /// 标记已读
    ///
    /// 未知或未解锁的 ID 被忽略，不影响解锁状态
    #[instrument(skip(self), fields(count = badge_ids.len()))]
    pub async fn mark_as_seen(&self, badge_ids: &[String]) -> Result<u64> {
        let affected = self.unlock_repo.mark_seen(badge_ids).await?;
        debug!(affected = affected, "徽章已标记为已读");
        Ok(affected)
    }

    /// 已解锁但尚未查看的徽章（按解锁时间排序）
    pub async fn unseen_unlocks(&self) -> Result<Vec<BadgeDefinition>> {
        let unlocks = self.unlock_repo.list_unlocks().await?;
        Ok(unlocks
            .into_iter()
            .filter(|u| !u.is_seen)
            .filter_map(|u| self.catalog.get(&u.badge_id).cloned())
            .collect())
    }
}
