//! Durable entities: one record per built-in category, plus the custom goal
//! container and its goals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use super::metric::{FitnessMetric, MentalHealthMetric, Metric};
use super::progress;
use super::streak::{self, Streak};

/// Tracked flags, metric values and streaks for one built-in category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CategoryRecord<M: Metric> {
    tracked: BTreeSet<M>,
    values: BTreeMap<M, u32>,
    streaks: BTreeMap<M, Streak>,
    pub updated_at: DateTime<Utc>,
}

pub type FitnessRecord = CategoryRecord<FitnessMetric>;
pub type MentalHealthRecord = CategoryRecord<MentalHealthMetric>;

impl<M: Metric> CategoryRecord<M> {
    /// Fresh record: nothing tracked, every value zero, no streaks.
    pub fn new() -> Self {
        Self {
            tracked: BTreeSet::new(),
            values: BTreeMap::new(),
            streaks: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_tracked(&self, metric: M) -> bool {
        self.tracked.contains(&metric)
    }

    pub fn set_tracked(&mut self, metric: M, tracked: bool) {
        if tracked {
            self.tracked.insert(metric);
        } else {
            self.tracked.remove(&metric);
        }
        self.touch();
    }

    /// Tracked metrics in display order.
    pub fn tracked(&self) -> impl Iterator<Item = M> + '_ {
        M::ALL.iter().copied().filter(|m| self.is_tracked(*m))
    }

    pub fn value(&self, metric: M) -> u32 {
        self.values.get(&metric).copied().unwrap_or(0)
    }

    pub fn set_value(&mut self, metric: M, value: u32) {
        self.values.insert(metric, value);
        self.touch();
    }

    pub fn streak(&self, metric: M) -> Option<Streak> {
        self.streaks.get(&metric).copied()
    }

    /// Apply one completion event to the metric's streak.
    pub fn record_completion(&mut self, metric: M, did_complete: bool) -> Streak {
        let next = streak::advance(self.streak(metric), did_complete);
        self.streaks.insert(metric, next);
        self.touch();
        next
    }

    /// Present streak entries in display order.
    pub fn streaks(&self) -> impl Iterator<Item = (M, Streak)> + '_ {
        M::ALL
            .iter()
            .copied()
            .filter_map(|m| self.streak(m).map(|s| (m, s)))
    }

    pub(crate) fn restore_streak(&mut self, metric: M, streak: Streak) {
        self.streaks.insert(metric, streak);
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl<M: Metric> Default for CategoryRecord<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// A user-defined goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomGoal {
    pub id: Uuid,
    pub name: String,
    pub target: u32,
    pub progress: u32,
    pub is_checkable: bool,
    pub created_at: DateTime<Utc>,
}

impl CustomGoal {
    pub fn new(name: impl Into<String>, target: u32, is_checkable: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target,
            progress: 0,
            is_checkable,
            created_at: Utc::now(),
        }
    }

    /// Derived on every call; never stored.
    pub fn is_completed(&self) -> bool {
        progress::is_complete(self.progress, self.target)
    }
}

/// Container for custom goals; also carries the onboarding gate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomGoalsRecord {
    pub is_onboarding_complete: bool,
    goals: Vec<CustomGoal>,
}

impl CustomGoalsRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_goals(is_onboarding_complete: bool, mut goals: Vec<CustomGoal>) -> Self {
        goals.sort_by_key(|g| g.created_at);
        Self {
            is_onboarding_complete,
            goals,
        }
    }

    /// Goals in creation order.
    pub fn goals(&self) -> &[CustomGoal] {
        &self.goals
    }

    pub fn goal(&self, id: Uuid) -> Option<&CustomGoal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn goal_mut(&mut self, id: Uuid) -> Option<&mut CustomGoal> {
        self.goals.iter_mut().find(|g| g.id == id)
    }

    pub fn attach(&mut self, goal: CustomGoal) {
        self.goals.push(goal);
    }

    pub fn detach(&mut self, id: Uuid) -> Option<CustomGoal> {
        let idx = self.goals.iter().position(|g| g.id == id)?;
        Some(self.goals.remove(idx))
    }
}
