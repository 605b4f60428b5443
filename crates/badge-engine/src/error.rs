//! 徽章引擎错误类型
//!
//! 定义目录校验、存储访问等错误

use thiserror::Error;

/// 徽章引擎错误类型
#[derive(Debug, Error)]
pub enum BadgeError {
    // === 目录相关错误 ===
    #[error("徽章 ID 重复: {0}")]
    DuplicateBadgeId(String),

    #[error("徽章定义无效: badge_id={badge_id}, {reason}")]
    InvalidDefinition { badge_id: String, reason: String },

    #[error("目录文件读取失败: {0}")]
    CatalogIo(#[from] std::io::Error),

    // === 存储相关错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("存储错误: {0}")]
    Storage(String),

    // === 系统错误 ===
    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 徽章引擎 Result 类型别名
pub type Result<T> = std::result::Result<T, BadgeError>;

impl BadgeError {
    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Storage(_))
    }

    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateBadgeId(_) => "DUPLICATE_BADGE_ID",
            Self::InvalidDefinition { .. } => "INVALID_DEFINITION",
            Self::CatalogIo(_) => "CATALOG_IO_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
