use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::goals::{MetricKey, Streak};

/// Every in-memory change made by the goal store produces an event.
/// Front ends subscribe to them to know when to re-read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StoreEvent {
    /// Entities were (re)loaded from durable storage.
    Loaded {
        at: DateTime<Utc>,
    },
    MetricChanged {
        metric: MetricKey,
        value: u32,
        at: DateTime<Utc>,
    },
    TrackingChanged {
        metric: MetricKey,
        tracked: bool,
        at: DateTime<Utc>,
    },
    StreakUpdated {
        metric: MetricKey,
        streak: Streak,
        at: DateTime<Utc>,
    },
    CustomGoalAdded {
        id: Uuid,
        at: DateTime<Utc>,
    },
    CustomGoalDeleted {
        id: Uuid,
        at: DateTime<Utc>,
    },
    CustomGoalProgressChanged {
        id: Uuid,
        progress: u32,
        completed: bool,
        at: DateTime<Utc>,
    },
    OnboardingCompleted {
        at: DateTime<Utc>,
    },
    /// Every record was wiped and recreated with defaults.
    DataReset {
        at: DateTime<Utc>,
    },
}
