//! 服务层
//!
//! ## 模块结构
//!
//! - `evaluator`: 规则判定（纯函数）
//! - `progress_service`: 进度计数
//! - `ledger_service`: 解锁账本
//! - `query_service`: 徽章视图查询
//! - `engine`: 对外统一入口

pub mod engine;
pub mod evaluator;
pub mod ledger_service;
pub mod progress_service;
pub mod query_service;

pub use engine::BadgeEngine;
pub use evaluator::Verdict;
pub use ledger_service::LedgerService;
pub use progress_service::ProgressService;
pub use query_service::BadgeQueryService;
