//! 连续打卡引擎错误类型

use thiserror::Error;

use badge_engine::BadgeError;

/// 连续打卡引擎错误类型
#[derive(Debug, Error)]
pub enum StreakError {
    #[error("习惯数据尚未加载完成")]
    NotHydrated,

    #[error("数据源读取失败: {0}")]
    Source(String),

    #[error("习惯数据无效: habit_id={habit_id}, {reason}")]
    InvalidHabit { habit_id: String, reason: String },

    #[error("文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("徽章判定失败: {0}")]
    Badge(#[from] BadgeError),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 连续打卡引擎 Result 类型别名
pub type Result<T> = std::result::Result<T, StreakError>;

impl StreakError {
    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotHydrated | Self::Source(_) => true,
            Self::Badge(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotHydrated => "NOT_HYDRATED",
            Self::Source(_) => "SOURCE_ERROR",
            Self::InvalidHabit { .. } => "INVALID_HABIT",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Badge(_) => "BADGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_error_retryability_passes_through() {
        let storage: StreakError = BadgeError::Storage("timeout".to_string()).into();
        assert!(storage.is_retryable());
        assert_eq!(storage.error_code(), "BADGE_ERROR");

        let invalid: StreakError = BadgeError::Validation("bad".to_string()).into();
        assert!(!invalid.is_retryable());
    }

    #[test]
    fn test_not_hydrated() {
        assert!(StreakError::NotHydrated.is_retryable());
        assert_eq!(StreakError::NotHydrated.error_code(), "NOT_HYDRATED");
    }
}
