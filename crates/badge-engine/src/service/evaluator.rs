//! 规则判定
//!
//! 纯函数：只根据徽章定义与事件上下文给出判定，不访问存储。
//! 计数累积类要求的持久化自增由引擎在判定为 `Accumulate` 后执行。

use crate::models::{AccumulationStrategy, BadgeDefinition, EventContext};

/// 单个徽章的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// 条件已满足
    Satisfied,
    /// 本次调用不满足（包括上下文缺少对应字段）
    Unsatisfied,
    /// 命中时间窗口，计数需 +1 后与阈值比较
    Accumulate,
}

/// 判定徽章在给定上下文下的结果
pub fn evaluate(badge: &BadgeDefinition, context: &EventContext) -> Verdict {
    let requirement = &badge.requirement;

    match requirement.kind().strategy() {
        AccumulationStrategy::ContextThreshold(field) => match context.value_of(field) {
            Some(value) if value >= requirement.threshold() => Verdict::Satisfied,
            _ => Verdict::Unsatisfied,
        },
        AccumulationStrategy::CounterAccumulation => {
            let in_window = match (requirement.window(), context.local_hour()) {
                (Some(window), Some(hour)) => window.contains_hour(hour),
                _ => false,
            };
            if in_window {
                Verdict::Accumulate
            } else {
                Verdict::Unsatisfied
            }
        }
    }
}

/// 自增后的计数是否达到阈值
pub fn counter_reached(badge: &BadgeDefinition, counter: i64) -> bool {
    counter >= badge.requirement.threshold()
}
