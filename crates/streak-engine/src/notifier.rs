//! 解锁通知
//!
//! 订阅者注册表。重算产生新解锁徽章时同步调用全部订阅者。

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use badge_engine::BadgeDefinition;
use parking_lot::RwLock;
use tracing::debug;

type Listener = Arc<dyn Fn(&[BadgeDefinition]) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: RwLock<BTreeMap<u64, Listener>>,
}

/// 解锁通知器
///
/// 克隆后共享同一份订阅者列表
#[derive(Clone, Default)]
pub struct UnlockNotifier {
    registry: Arc<Registry>,
}

impl UnlockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册订阅者，返回取消订阅句柄
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&[BadgeDefinition]) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.listeners.write().insert(id, Arc::new(listener));
        debug!(subscription_id = id, "解锁订阅已注册");

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// 按注册顺序通知全部订阅者，返回被通知的数量
    ///
    /// 调用订阅者前先复制列表，订阅者可以在回调中取消订阅
    pub fn notify(&self, badges: &[BadgeDefinition]) -> usize {
        let listeners: Vec<Listener> = self.registry.listeners.read().values().cloned().collect();
        for listener in &listeners {
            listener(badges);
        }
        listeners.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.listeners.read().len()
    }
}

impl std::fmt::Debug for UnlockNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// 取消订阅句柄
///
/// 丢弃句柄不会取消订阅
#[must_use = "丢弃句柄后将无法取消订阅"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 取消订阅，返回此前是否处于订阅状态
    pub fn unsubscribe(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.listeners.write().remove(&self.id).is_some(),
            None => false,
        }
    }
}
