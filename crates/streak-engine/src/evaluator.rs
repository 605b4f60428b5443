//! 徽章判定接口
//!
//! 重算器只依赖该 trait，徽章引擎实现它；测试中可替换为 mock。

use async_trait::async_trait;

use badge_engine::{BadgeDefinition, BadgeEngine, EventContext, EventType};

/// 徽章判定接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UnlockEvaluator: Send + Sync {
    async fn check_unlock(
        &self,
        event_type: EventType,
        context: &EventContext,
    ) -> badge_engine::Result<Vec<BadgeDefinition>>;
}

#[async_trait]
impl UnlockEvaluator for BadgeEngine {
    async fn check_unlock(
        &self,
        event_type: EventType,
        context: &EventContext,
    ) -> badge_engine::Result<Vec<BadgeDefinition>> {
        BadgeEngine::check_unlock(self, event_type, context).await
    }
}
