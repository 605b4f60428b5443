//! 数据访问层
//!
//! 两张逻辑表 `user_badges` 与 `badge_progress` 的仓储实现。

mod memory;
mod progress_repo;
mod schema;
mod traits;
mod user_badge_repo;

pub use memory::MemoryBadgeStore;
pub use progress_repo::BadgeProgressRepository;
pub use schema::ensure_schema;
pub use traits::*;
pub use user_badge_repo::UserBadgeRepository;
