//! 进度计数服务
//!
//! 同一徽章的写入经键控锁串行化，自增由仓储以原子 upsert 完成。

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument};

use crate::catalog::BadgeCatalog;
use crate::error::{BadgeError, Result};
use crate::lock::LockManager;
use crate::models::BadgeProgress;
use crate::repository::BadgeProgressRepositoryTrait;

fn lock_key(badge_id: &str) -> String {
    format!("progress:{}", badge_id)
}

/// 进度计数服务
pub struct ProgressService {
    catalog: Arc<BadgeCatalog>,
    progress_repo: Arc<dyn BadgeProgressRepositoryTrait>,
    locks: LockManager,
}

impl ProgressService {
    pub fn new(
        catalog: Arc<BadgeCatalog>,
        progress_repo: Arc<dyn BadgeProgressRepositoryTrait>,
        locks: LockManager,
    ) -> Self {
        Self {
            catalog,
            progress_repo,
            locks,
        }
    }

    /// 覆盖写入绝对值
    ///
    /// 目录外的徽章 ID 被忽略；只写计数，不触发解锁
    #[instrument(skip(self))]
    pub async fn update_progress(&self, badge_id: &str, value: i64) -> Result<()> {
        if value < 0 {
            return Err(BadgeError::Validation(format!(
                "进度值不能为负数: badge_id={}, value={}",
                badge_id, value
            )));
        }
        if !self.catalog.contains(badge_id) {
            debug!(badge_id = %badge_id, "忽略目录外的进度更新");
            return Ok(());
        }

        let _guard = self.locks.acquire(&lock_key(badge_id)).await;

        // 保留已有的附加数据
        let meta = self
            .progress_repo
            .get_progress(badge_id)
            .await?
            .and_then(|existing| existing.meta);

        let mut progress = BadgeProgress::new(badge_id, value);
        progress.meta = meta;
        self.progress_repo.upsert_progress(&progress).await?;

        debug!(badge_id = %badge_id, value = value, "进度已更新");
        Ok(())
    }

    /// 计数 +1，返回新值
    ///
    /// 目录外的徽章 ID 不写入，返回 0
    #[instrument(skip(self))]
    pub async fn increment_progress(&self, badge_id: &str) -> Result<i64> {
        if !self.catalog.contains(badge_id) {
            debug!(badge_id = %badge_id, "忽略目录外的进度自增");
            return Ok(0);
        }

        let _guard = self.locks.acquire(&lock_key(badge_id)).await;
        let value = self
            .progress_repo
            .increment_progress(badge_id, Utc::now())
            .await?;

        debug!(badge_id = %badge_id, value = value, "进度已自增");
        Ok(value)
    }

    /// 当前计数，无记录时为 0
    pub async fn current_value(&self, badge_id: &str) -> Result<i64> {
        Ok(self
            .progress_repo
            .get_progress(badge_id)
            .await?
            .map(|p| p.current_value)
            .unwrap_or(0))
    }
}
