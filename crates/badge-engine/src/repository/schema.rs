//! 表结构初始化
//!
//! 两张表都以 badge_id 为主键，行在首次写入时懒创建

use sqlx::PgPool;
use tracing::{info, instrument};

use crate::error::Result;

const CREATE_USER_BADGES: &str = r#"
CREATE TABLE IF NOT EXISTS user_badges (
    badge_id    VARCHAR(64) PRIMARY KEY,
    unlocked_at TIMESTAMPTZ NOT NULL,
    is_seen     BOOLEAN     NOT NULL DEFAULT FALSE,
    source      VARCHAR(16) NOT NULL DEFAULT 'rule'
)
"#;

const CREATE_BADGE_PROGRESS: &str = r#"
CREATE TABLE IF NOT EXISTS badge_progress (
    badge_id      VARCHAR(64) PRIMARY KEY,
    current_value BIGINT      NOT NULL DEFAULT 0 CHECK (current_value >= 0),
    meta          JSONB,
    last_updated  TIMESTAMPTZ NOT NULL
)
"#;

/// 确保表结构存在（幂等）
#[instrument(skip(pool))]
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(CREATE_USER_BADGES).execute(pool).await?;
    sqlx::query(CREATE_BADGE_PROGRESS).execute(pool).await?;
    info!("徽章表结构已就绪");
    Ok(())
}
