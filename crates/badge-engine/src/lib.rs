//! 徽章引擎
//!
//! 根据习惯事件判定并解锁成就徽章。
//!
//! ## 核心功能
//!
//! - **徽章目录**：启动时注入的不可变徽章定义，支持内置目录与 JSON 文件
//! - **解锁判定**：上下文阈值与计数累积两种策略，只返回本次新解锁的徽章
//! - **进度计数**：按徽章持久化的计数，同一徽章的写入串行执行
//! - **解锁账本**：只追加的解锁记录与已读标记
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `catalog`: 徽章目录
//! - `repository`: 存储层（PostgreSQL / 内存）
//! - `lock`: 进程内键控锁
//! - `service`: 业务服务层

pub mod catalog;
pub mod error;
pub mod lock;
pub mod models;
pub mod repository;
pub mod service;

pub use catalog::{BadgeCatalog, is_relevant_event};
pub use error::{BadgeError, Result};
pub use lock::{LockGuard, LockManager};
pub use models::*;
pub use repository::{
    BadgeProgressRepository, BadgeProgressRepositoryTrait, MemoryBadgeStore, UserBadgeRepository,
    UserBadgeRepositoryTrait, ensure_schema,
};
pub use service::{BadgeEngine, BadgeQueryService, LedgerService, ProgressService};
