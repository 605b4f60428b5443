//! 徽章目录
//!
//! 启动时注入的不可变徽章定义集合。
//!
//! ## 事件相关性
//!
//! `is_relevant_event` 按要求类型固定映射到可能满足它的事件类型，
//! 用于在评估前排除当前事件不可能影响的徽章，与数值条件是否满足无关。

pub mod builtin;

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::error::{BadgeError, Result};
use crate::models::{BadgeDefinition, EventType};

/// 判断事件类型是否可能满足该徽章的要求
pub fn is_relevant_event(badge: &BadgeDefinition, event_type: EventType) -> bool {
    badge
        .requirement
        .kind()
        .relevant_events()
        .contains(&event_type)
}

/// 徽章目录
///
/// 构造时校验 ID 唯一性与各定义参数，之后只读
#[derive(Debug, Clone)]
pub struct BadgeCatalog {
    badges: Vec<BadgeDefinition>,
    index: HashMap<String, usize>,
}

impl BadgeCatalog {
    /// 从定义列表构建目录
    pub fn new(badges: Vec<BadgeDefinition>) -> Result<Self> {
        let mut index = HashMap::with_capacity(badges.len());

        for (position, badge) in badges.iter().enumerate() {
            badge
                .validate()
                .map_err(|reason| BadgeError::InvalidDefinition {
                    badge_id: badge.id.clone(),
                    reason,
                })?;

            if index.insert(badge.id.clone(), position).is_some() {
                return Err(BadgeError::DuplicateBadgeId(badge.id.clone()));
            }
        }

        Ok(Self { badges, index })
    }

    /// 内置目录
    pub fn builtin() -> Self {
        let badges = builtin::definitions();
        let index = badges
            .iter()
            .enumerate()
            .map(|(position, badge)| (badge.id.clone(), position))
            .collect();
        Self { badges, index }
    }

    /// 从 JSON 数组加载目录
    pub fn from_json(json: &str) -> Result<Self> {
        let badges: Vec<BadgeDefinition> = serde_json::from_str(json)?;
        Self::new(badges)
    }

    /// 从 JSON 文件加载目录
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        info!(path = %path.display(), badge_count = catalog.len(), "徽章目录已加载");
        Ok(catalog)
    }

    pub fn get(&self, badge_id: &str) -> Option<&BadgeDefinition> {
        self.index.get(badge_id).map(|&position| &self.badges[position])
    }

    pub fn contains(&self, badge_id: &str) -> bool {
        self.index.contains_key(badge_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BadgeDefinition> {
        self.badges.iter()
    }

    /// 与事件相关的徽章
    pub fn relevant_to(&self, event_type: EventType) -> impl Iterator<Item = &BadgeDefinition> {
        self.badges
            .iter()
            .filter(move |badge| is_relevant_event(badge, event_type))
    }

    pub fn len(&self) -> usize {
        self.badges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }
}
