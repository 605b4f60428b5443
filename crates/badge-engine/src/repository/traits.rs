//! 仓储 Trait 定义
//!
//! 服务层依赖抽象而非具体实现，支持 PostgreSQL、内存两种后端以及 mock 测试。
//! 每个 trait 对应一张逻辑表，方法覆盖"全量读取 / 单行读取 / 写入"三类操作。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{BadgeProgress, BadgeUnlock};

/// 解锁账本仓储接口（`user_badges` 表）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserBadgeRepositoryTrait: Send + Sync {
    async fn list_unlocks(&self) -> Result<Vec<BadgeUnlock>>;
    async fn get_unlock(&self, badge_id: &str) -> Result<Option<BadgeUnlock>>;
    /// 仅在不存在时写入，返回是否新写入
    async fn insert_unlock(&self, unlock: &BadgeUnlock) -> Result<bool>;
    /// 将给定徽章标记为已读，返回受影响的行数
    async fn mark_seen(&self, badge_ids: &[String]) -> Result<u64>;
}

/// 进度计数仓储接口（`badge_progress` 表）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeProgressRepositoryTrait: Send + Sync {
    async fn list_progress(&self) -> Result<Vec<BadgeProgress>>;
    async fn get_progress(&self, badge_id: &str) -> Result<Option<BadgeProgress>>;
    /// 覆盖写入绝对值（后写者胜）
    async fn upsert_progress(&self, progress: &BadgeProgress) -> Result<()>;
    /// 原子自增，无记录时从 0 开始，返回自增后的值
    async fn increment_progress(&self, badge_id: &str, at: DateTime<Utc>) -> Result<i64>;
}
