//! 进度计数仓储（PostgreSQL）
//!
//! 自增使用单条 upsert 语句完成，避免先读后写的丢失更新

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use super::traits::BadgeProgressRepositoryTrait;
use crate::error::Result;
use crate::models::BadgeProgress;

/// 进度计数仓储
pub struct BadgeProgressRepository {
    pool: PgPool,
}

impl BadgeProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    pub async fn list_progress(&self) -> Result<Vec<BadgeProgress>> {
        let rows = sqlx::query_as::<_, BadgeProgress>(
            r#"
            SELECT badge_id, current_value, meta, last_updated
            FROM badge_progress
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_progress(&self, badge_id: &str) -> Result<Option<BadgeProgress>> {
        let row = sqlx::query_as::<_, BadgeProgress>(
            r#"
            SELECT badge_id, current_value, meta, last_updated
            FROM badge_progress
            WHERE badge_id = $1
            "#,
        )
        .bind(badge_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ==================== 写入操作 ====================

    /// 覆盖写入绝对值
    pub async fn upsert_progress(&self, progress: &BadgeProgress) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO badge_progress (badge_id, current_value, meta, last_updated)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (badge_id) DO UPDATE
            SET current_value = EXCLUDED.current_value,
                meta = EXCLUDED.meta,
                last_updated = EXCLUDED.last_updated
            "#,
        )
        .bind(&progress.badge_id)
        .bind(progress.current_value)
        .bind(&progress.meta)
        .bind(progress.last_updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 原子自增
    pub async fn increment_progress(&self, badge_id: &str, at: DateTime<Utc>) -> Result<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO badge_progress (badge_id, current_value, meta, last_updated)
            VALUES ($1, 1, NULL, $2)
            ON CONFLICT (badge_id) DO UPDATE
            SET current_value = badge_progress.current_value + 1,
                last_updated = EXCLUDED.last_updated
            RETURNING current_value
            "#,
        )
        .bind(badge_id)
        .bind(at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("current_value"))
    }
}

#[async_trait]
impl BadgeProgressRepositoryTrait for BadgeProgressRepository {
    async fn list_progress(&self) -> Result<Vec<BadgeProgress>> {
        self.list_progress().await
    }

    async fn get_progress(&self, badge_id: &str) -> Result<Option<BadgeProgress>> {
        self.get_progress(badge_id).await
    }

    async fn upsert_progress(&self, progress: &BadgeProgress) -> Result<()> {
        self.upsert_progress(progress).await
    }

    async fn increment_progress(&self, badge_id: &str, at: DateTime<Utc>) -> Result<i64> {
        self.increment_progress(badge_id, at).await
    }
}
