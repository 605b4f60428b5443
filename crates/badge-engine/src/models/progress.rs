//! 徽章进度与解锁记录
//!
//! 对应两张逻辑表：`badge_progress` 与 `user_badges`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::UnlockSource;

/// 徽章进度计数
///
/// 首次写入时懒创建；`current_value` 只通过显式的更新/自增调用变化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BadgeProgress {
    pub badge_id: String,
    pub current_value: i64,
    /// 不透明的附加数据
    #[sqlx(default)]
    pub meta: Option<serde_json::Value>,
    pub last_updated: DateTime<Utc>,
}

impl BadgeProgress {
    pub fn new(badge_id: impl Into<String>, current_value: i64) -> Self {
        Self {
            badge_id: badge_id.into(),
            current_value,
            meta: None,
            last_updated: Utc::now(),
        }
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// 徽章解锁记录
///
/// 只追加：同一徽章只写一次，`unlocked_at` 首次写入后不再改变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BadgeUnlock {
    pub badge_id: String,
    pub unlocked_at: DateTime<Utc>,
    pub is_seen: bool,
    pub source: UnlockSource,
}

impl BadgeUnlock {
    /// 创建一条未读的解锁记录
    pub fn new(badge_id: impl Into<String>, source: UnlockSource) -> Self {
        Self {
            badge_id: badge_id.into(),
            unlocked_at: Utc::now(),
            is_seen: false,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_unlock_is_unseen() {
        let unlock = BadgeUnlock::new("vol_1", UnlockSource::Rule);
        assert_eq!(unlock.badge_id, "vol_1");
        assert!(!unlock.is_seen);
        assert_eq!(unlock.source, UnlockSource::Rule);
    }

    #[test]
    fn test_progress_meta() {
        let progress = BadgeProgress::new("time_morning_5", 3).with_meta(json!({"lastHour": 5}));
        assert_eq!(progress.current_value, 3);
        assert_eq!(progress.meta, Some(json!({"lastHour": 5})));
    }

    #[test]
    fn test_unlock_serializes_camel_case() {
        let unlock = BadgeUnlock::new("vol_1", UnlockSource::Manual);
        let value = serde_json::to_value(&unlock).unwrap();
        assert_eq!(value["badgeId"], "vol_1");
        assert_eq!(value["isSeen"], false);
        assert_eq!(value["source"], "manual");
    }
}
