//! 解锁账本仓储（PostgreSQL）
//!
//! 解锁记录只追加，依赖主键冲突保证同一徽章只写一次

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::UserBadgeRepositoryTrait;
use crate::error::Result;
use crate::models::BadgeUnlock;

/// 解锁账本仓储
pub struct UserBadgeRepository {
    pool: PgPool,
}

impl UserBadgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    /// 列出全部解锁记录
    pub async fn list_unlocks(&self) -> Result<Vec<BadgeUnlock>> {
        let unlocks = sqlx::query_as::<_, BadgeUnlock>(
            r#"
            SELECT badge_id, unlocked_at, is_seen, source
            FROM user_badges
            ORDER BY unlocked_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(unlocks)
    }

    /// 获取某个徽章的解锁记录
    pub async fn get_unlock(&self, badge_id: &str) -> Result<Option<BadgeUnlock>> {
        let unlock = sqlx::query_as::<_, BadgeUnlock>(
            r#"
            SELECT badge_id, unlocked_at, is_seen, source
            FROM user_badges
            WHERE badge_id = $1
            "#,
        )
        .bind(badge_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(unlock)
    }

    // ==================== 写入操作 ====================

    /// 写入解锁记录
    ///
    /// 已存在时不做任何修改，`unlocked_at` 保持首次写入的值
    pub async fn insert_unlock(&self, unlock: &BadgeUnlock) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_badges (badge_id, unlocked_at, is_seen, source)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (badge_id) DO NOTHING
            "#,
        )
        .bind(&unlock.badge_id)
        .bind(unlock.unlocked_at)
        .bind(unlock.is_seen)
        .bind(unlock.source)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// 批量标记已读
    ///
    /// 不存在的徽章 ID 不会产生任何写入
    pub async fn mark_seen(&self, badge_ids: &[String]) -> Result<u64> {
        if badge_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE user_badges
            SET is_seen = TRUE
            WHERE badge_id = ANY($1) AND is_seen = FALSE
            "#,
        )
        .bind(badge_ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl UserBadgeRepositoryTrait for UserBadgeRepository {
    async fn list_unlocks(&self) -> Result<Vec<BadgeUnlock>> {
        self.list_unlocks().await
    }

    async fn get_unlock(&self, badge_id: &str) -> Result<Option<BadgeUnlock>> {
        self.get_unlock(badge_id).await
    }

    async fn insert_unlock(&self, unlock: &BadgeUnlock) -> Result<bool> {
        self.insert_unlock(unlock).await
    }

    async fn mark_seen(&self, badge_ids: &[String]) -> Result<u64> {
        self.mark_seen(badge_ids).await
    }
}
