//! 徽章引擎领域模型

pub mod badge;
pub mod context;
pub mod enums;
pub mod progress;

pub use badge::{BadgeDefinition, BadgeRequirement, BadgeView, TimeWindow};
pub use context::EventContext;
pub use enums::{
    AccumulationStrategy, BadgeCategory, ContextField, EventType, RequirementKind, UnlockSource,
};
pub use progress::{BadgeProgress, BadgeUnlock};
