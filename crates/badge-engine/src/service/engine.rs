//! 徽章引擎
//!
//! 对外统一入口，组合目录、解锁账本、进度计数与查询服务。
//!
//! ## 判定流程
//!
//! 1. 读取已解锁徽章集合
//! 2. 候选 = 目录中未解锁且与事件相关的徽章
//! 3. 上下文阈值类直接比较；计数累积类命中窗口时持久化 +1 后比较
//! 4. 满足条件的候选逐个写入解锁记录，单个写入失败只跳过该徽章
//! 5. 只返回本次调用新解锁的徽章
//!
//! 同一进程内同时最多只有一次判定在执行。

use std::sync::Arc;
use std::time::Instant;

use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use badge_shared::observability::metrics;

use super::evaluator::{self, Verdict};
use super::{BadgeQueryService, LedgerService, ProgressService};
use crate::catalog::{self, BadgeCatalog};
use crate::error::Result;
use crate::lock::LockManager;
use crate::models::{BadgeDefinition, BadgeView, EventContext, EventType, UnlockSource};
use crate::repository::{
    BadgeProgressRepository, BadgeProgressRepositoryTrait, MemoryBadgeStore, UserBadgeRepository,
    UserBadgeRepositoryTrait,
};

/// 徽章引擎
pub struct BadgeEngine {
    catalog: Arc<BadgeCatalog>,
    ledger: LedgerService,
    progress: ProgressService,
    query: BadgeQueryService,
    evaluation_gate: Mutex<()>,
}

impl BadgeEngine {
    pub fn new(
        catalog: BadgeCatalog,
        unlock_repo: Arc<dyn UserBadgeRepositoryTrait>,
        progress_repo: Arc<dyn BadgeProgressRepositoryTrait>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let locks = LockManager::new();

        Self {
            ledger: LedgerService::new(catalog.clone(), unlock_repo.clone(), locks.clone()),
            progress: ProgressService::new(catalog.clone(), progress_repo.clone(), locks),
            query: BadgeQueryService::new(catalog.clone(), unlock_repo, progress_repo),
            catalog,
            evaluation_gate: Mutex::new(()),
        }
    }

    /// 使用内存存储创建引擎
    pub fn in_memory(catalog: BadgeCatalog) -> Self {
        let store = Arc::new(MemoryBadgeStore::new());
        Self::new(catalog, store.clone(), store)
    }

    /// 使用 PostgreSQL 存储创建引擎
    pub fn with_pool(catalog: BadgeCatalog, pool: PgPool) -> Self {
        Self::new(
            catalog,
            Arc::new(UserBadgeRepository::new(pool.clone())),
            Arc::new(BadgeProgressRepository::new(pool)),
        )
    }

    pub fn catalog(&self) -> &BadgeCatalog {
        &self.catalog
    }

    pub fn is_relevant_event(&self, badge: &BadgeDefinition, event_type: EventType) -> bool {
        catalog::is_relevant_event(badge, event_type)
    }

    /// 根据事件检查并解锁徽章
    ///
    /// 返回本次调用新解锁的徽章；空上下文是合法输入，只是不会解锁任何徽章。
    /// 读取账本或累加计数失败时返回错误；解锁记录写入失败的徽章保持未解锁，
    /// 下次调用重新评估，其余徽章照常写入并返回。
    #[instrument(skip(self, context), fields(event_type = %event_type))]
    pub async fn check_unlock(
        &self,
        event_type: EventType,
        context: &EventContext,
    ) -> Result<Vec<BadgeDefinition>> {
        let _gate = self.evaluation_gate.lock().await;
        let start = Instant::now();

        let unlocked = self.ledger.unlocked_ids().await?;
        let candidates: Vec<&BadgeDefinition> = self
            .catalog
            .relevant_to(event_type)
            .filter(|badge| !unlocked.contains(&badge.id))
            .collect();

        if candidates.is_empty() {
            debug!("没有需要评估的候选徽章");
            metrics::record_badge_evaluation(event_type.as_str(), 0, start.elapsed().as_secs_f64());
            return Ok(Vec::new());
        }

        let mut satisfied = Vec::new();
        for badge in candidates {
            match evaluator::evaluate(badge, context) {
                Verdict::Satisfied => satisfied.push(badge),
                Verdict::Accumulate => {
                    let counter = self.progress.increment_progress(&badge.id).await?;
                    debug!(badge_id = %badge.id, counter = counter, "时段计数已累加");
                    if evaluator::counter_reached(badge, counter) {
                        satisfied.push(badge);
                    }
                }
                Verdict::Unsatisfied => {}
            }
        }

        let mut newly_unlocked = Vec::with_capacity(satisfied.len());
        for badge in satisfied {
            match self.ledger.record_unlock(&badge.id, UnlockSource::Rule).await {
                Ok(true) => newly_unlocked.push(badge.clone()),
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        badge_id = %badge.id,
                        error = %e,
                        "解锁记录写入失败，下次事件重新评估"
                    );
                }
            }
        }

        metrics::record_badge_evaluation(
            event_type.as_str(),
            newly_unlocked.len(),
            start.elapsed().as_secs_f64(),
        );

        if !newly_unlocked.is_empty() {
            info!(
                unlocked_count = newly_unlocked.len(),
                badge_ids = ?newly_unlocked.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
                "事件触发徽章解锁"
            );
        }

        Ok(newly_unlocked)
    }

    /// 全部徽章视图
    pub async fn get_badges(&self) -> Result<Vec<BadgeView>> {
        self.query.get_badges().await
    }

    pub async fn update_progress(&self, badge_id: &str, value: i64) -> Result<()> {
        self.progress.update_progress(badge_id, value).await
    }

    pub async fn increment_progress(&self, badge_id: &str) -> Result<i64> {
        self.progress.increment_progress(badge_id).await
    }

    pub async fn unlock_badge(&self, badge_id: &str) -> Result<bool> {
        self.ledger.unlock_badge(badge_id).await
    }

    pub async fn mark_as_seen(&self, badge_ids: &[String]) -> Result<u64> {
        self.ledger.mark_as_seen(badge_ids).await
    }

    /// 已解锁但未查看的徽章
    pub async fn unseen_unlocks(&self) -> Result<Vec<BadgeDefinition>> {
        self.ledger.unseen_unlocks().await
    }
}
