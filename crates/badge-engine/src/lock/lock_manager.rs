//! 键控锁管理器
//!
//! 每个 key 对应一把 tokio 互斥锁，按需创建，不同 key 之间互不阻塞。

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, instrument};

/// 键控锁管理器
///
/// 克隆后共享同一张锁表
#[derive(Debug, Clone, Default)]
pub struct LockManager {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &str) -> Arc<Mutex<()>> {
        // 先释放 DashMap 分片锁再等待互斥锁
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 获取锁，锁被占用时等待
    #[instrument(skip(self))]
    pub async fn acquire(&self, key: &str) -> LockGuard {
        let guard = self.slot(key).lock_owned().await;
        debug!(key = %key, "Lock acquired");
        LockGuard {
            key: key.to_string(),
            _guard: guard,
        }
    }

    /// 尝试获取锁，不等待
    ///
    /// 锁被占用时立即返回 None
    pub fn try_acquire(&self, key: &str) -> Option<LockGuard> {
        self.slot(key).try_lock_owned().ok().map(|guard| LockGuard {
            key: key.to_string(),
            _guard: guard,
        })
    }

    /// 当前登记的 key 数量
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// 锁守卫
///
/// drop 时释放锁
pub struct LockGuard {
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl LockGuard {
    /// 获取锁的 key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 显式释放锁
    pub fn release(self) {
        debug!(key = %self.key, "Lock released");
    }
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = LockManager::new();

        let guard = locks.acquire("progress:vol_1").await;
        assert_eq!(guard.key(), "progress:vol_1");
        assert!(locks.try_acquire("progress:vol_1").is_none());

        guard.release();
        assert!(locks.try_acquire("progress:vol_1").is_some());
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = LockManager::new();

        let _a = locks.acquire("progress:a").await;
        let b = locks.try_acquire("progress:b");
        assert!(b.is_some());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_waiter_resumes_after_release() {
        let locks = LockManager::new();
        let guard = locks.acquire("unlock:streak_7").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let g = locks.acquire("unlock:streak_7").await;
                g.key().to_string()
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        let key = waiter.await.unwrap();
        assert_eq!(key, "unlock:streak_7");
    }
}
