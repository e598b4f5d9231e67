//! Progress and completion rules.
//!
//! The store never distinguishes incrementable from checkable goals; these
//! helpers compute the value a front end hands to `set_metric` or
//! `set_custom_goal_progress`.

use serde::{Deserialize, Serialize};

use super::metric::Metric;
use super::record::{CategoryRecord, CustomGoal};

/// A single user interaction on a goal row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "amount")]
pub enum GoalAction {
    /// Add a fixed step, stopping at the target.
    Increment(u32),
    /// Jump straight to the target.
    Check,
    /// Overwrite with an explicit value.
    Set(u32),
}

/// `progress >= target`.
pub fn is_complete(progress: u32, target: u32) -> bool {
    progress >= target
}

/// Progress after applying `action`.
///
/// Increments are clamped at the target unless the value is already past it,
/// in which case it is left alone. Checking an already complete goal is a
/// no-op.
pub fn apply(current: u32, target: u32, action: GoalAction) -> u32 {
    match action {
        GoalAction::Increment(step) => {
            if current >= target {
                current
            } else {
                current.saturating_add(step).min(target)
            }
        }
        GoalAction::Check => current.max(target),
        GoalAction::Set(value) => value,
    }
}

/// The default action for a row: checkable rows check, others add one step.
pub fn default_action(is_checkable: bool, step: u32) -> GoalAction {
    if is_checkable {
        GoalAction::Check
    } else {
        GoalAction::Increment(step)
    }
}

/// `progress / target` in `0.0..=1.0`.
pub fn completion_ratio(progress: u32, target: u32) -> f64 {
    if target == 0 {
        return 1.0;
    }
    (f64::from(progress) / f64::from(target)).min(1.0)
}

/// Overall progress for a built-in category.
///
/// Averages the ratio of every tracked metric that has started, capped at
/// 1.0. Metrics still at zero do not drag the average down.
pub fn category_overview<M: Metric>(record: &CategoryRecord<M>, target: impl Fn(M) -> u32) -> f64 {
    let started: Vec<f64> = record
        .tracked()
        .map(|m| completion_ratio(record.value(m), target(m)))
        .filter(|r| *r > 0.0)
        .collect();
    if started.is_empty() {
        return 0.0;
    }
    (started.iter().sum::<f64>() / started.len() as f64).min(1.0)
}

/// Overall progress across every custom goal.
pub fn custom_overview(goals: &[CustomGoal]) -> f64 {
    if goals.is_empty() {
        return 0.0;
    }
    let total: f64 = goals
        .iter()
        .map(|g| completion_ratio(g.progress, g.target))
        .sum();
    total / goals.len() as f64
}
