//! 进程内键控锁
//!
//! 同一徽章 ID 上的进度自增与解锁写入必须串行执行，
//! 否则"先读后写"的交错会导致丢失更新。
//!
//! ## 使用示例
//!
//! ```ignore
//! let locks = LockManager::new();
//!
//! let guard = locks.acquire("progress:time_morning_5").await;
//! let next = repo.increment_progress("time_morning_5", Utc::now()).await?;
//! guard.release();
//! ```

mod lock_manager;

pub use lock_manager::{LockGuard, LockManager};
