//! Activity timer implementation.
//!
//! The timer is a wall-clock-based state machine counting minutes up toward a
//! goal. It does not use internal threads: the caller calls `tick()`
//! periodically, usually from [`super::spawn_ticker`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Idle | Completed)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = ActivityTimer::new(meditation, 12, 60, Duration::from_secs(60));
//! timer.start();
//! // In a loop:
//! for event in timer.tick() { /* persist increments */ }
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::goals::MetricKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    /// The goal was reached and the timer stopped itself.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimerEvent {
    Started {
        metric: MetricKey,
        value: u32,
        at: DateTime<Utc>,
    },
    /// One whole period elapsed; `value` is the new progress.
    Increment {
        metric: MetricKey,
        value: u32,
        at: DateTime<Utc>,
    },
    GoalReached {
        metric: MetricKey,
        value: u32,
        at: DateTime<Utc>,
    },
    Stopped {
        metric: MetricKey,
        value: u32,
        at: DateTime<Utc>,
    },
}

/// Countup timer for one metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityTimer {
    metric: MetricKey,
    value: u32,
    target: u32,
    period_ms: u64,
    state: TimerState,
    /// Timestamp (ms since epoch) of the last flush while running.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
    /// Elapsed time not yet worth a whole period.
    #[serde(default)]
    carry_ms: u64,
}

impl ActivityTimer {
    pub fn new(metric: MetricKey, value: u32, target: u32, period: Duration) -> Self {
        Self {
            metric,
            value,
            target,
            period_ms: duration_ms(period).max(1),
            state: TimerState::Idle,
            last_tick_epoch_ms: None,
            carry_ms: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn metric(&self) -> MetricKey {
        self.metric
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<TimerEvent> {
        self.start_at(now_ms())
    }

    /// Start counting from `now_ms`.
    ///
    /// No-op when already running or when the goal is already met.
    pub fn start_at(&mut self, now_ms: u64) -> Option<TimerEvent> {
        if self.state == TimerState::Running || self.value >= self.target {
            return None;
        }
        self.state = TimerState::Running;
        self.last_tick_epoch_ms = Some(now_ms);
        self.carry_ms = 0;
        Some(TimerEvent::Started {
            metric: self.metric,
            value: self.value,
            at: Utc::now(),
        })
    }

    /// Stop counting. A partial period is discarded.
    pub fn stop(&mut self) -> Option<TimerEvent> {
        if self.state != TimerState::Running {
            return None;
        }
        self.state = TimerState::Idle;
        self.last_tick_epoch_ms = None;
        self.carry_ms = 0;
        Some(TimerEvent::Stopped {
            metric: self.metric,
            value: self.value,
            at: Utc::now(),
        })
    }

    /// Call periodically.
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        self.tick_at(now_ms())
    }

    /// Emit one `Increment` per whole period elapsed since the last tick.
    /// Reaching the target emits `GoalReached` and stops the timer.
    pub fn tick_at(&mut self, now_ms: u64) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if self.state != TimerState::Running {
            return events;
        }
        let Some(last) = self.last_tick_epoch_ms else {
            return events;
        };

        let elapsed = now_ms.saturating_sub(last).saturating_add(self.carry_ms);
        let periods = elapsed / self.period_ms;
        self.carry_ms = elapsed % self.period_ms;
        self.last_tick_epoch_ms = Some(now_ms);

        for _ in 0..periods {
            self.value = self.value.saturating_add(1);
            events.push(TimerEvent::Increment {
                metric: self.metric,
                value: self.value,
                at: Utc::now(),
            });
            if self.value >= self.target {
                self.state = TimerState::Completed;
                self.last_tick_epoch_ms = None;
                self.carry_ms = 0;
                tracing::info!(metric = %self.metric, value = self.value, "goal reached, timer stopped");
                events.push(TimerEvent::GoalReached {
                    metric: self.metric,
                    value: self.value,
                    at: Utc::now(),
                });
                break;
            }
        }
        events
    }
}

pub(crate) fn now_ms() -> u64 {
    duration_ms(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default(),
    )
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::MentalHealthMetric;

    const MINUTE: u64 = 60_000;

    fn meditation(value: u32, target: u32) -> ActivityTimer {
        ActivityTimer::new(
            MentalHealthMetric::Meditation.into(),
            value,
            target,
            Duration::from_secs(60),
        )
    }

    fn increments(events: &[TimerEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, TimerEvent::Increment { .. }))
            .count()
    }

    #[test]
    fn start_stop() {
        let mut timer = meditation(0, 60);
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(timer.start_at(0).is_some());
        assert!(timer.is_active());
        assert!(timer.start_at(10).is_none());
        assert!(timer.stop().is_some());
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(timer.stop().is_none());
    }

    #[test]
    fn one_increment_per_whole_period() {
        let mut timer = meditation(0, 60);
        timer.start_at(0);
        assert!(timer.tick_at(MINUTE - 1).is_empty());
        assert_eq!(increments(&timer.tick_at(MINUTE)), 1);
        assert_eq!(timer.value(), 1);

        // Late ticks catch up.
        assert_eq!(increments(&timer.tick_at(MINUTE * 4 + 500)), 3);
        assert_eq!(timer.value(), 4);
        // The leftover half second still counts toward the next period.
        assert_eq!(increments(&timer.tick_at(MINUTE * 5)), 1);
    }

    #[test]
    fn stops_exactly_once_at_goal() {
        let mut timer = meditation(58, 60);
        timer.start_at(0);
        let events = timer.tick_at(MINUTE * 10);
        assert_eq!(increments(&events), 2);
        let reached = events
            .iter()
            .filter(|e| matches!(e, TimerEvent::GoalReached { .. }))
            .count();
        assert_eq!(reached, 1);
        assert_eq!(timer.value(), 60);
        assert_eq!(timer.state(), TimerState::Completed);

        assert!(timer.tick_at(MINUTE * 20).is_empty());
        assert!(timer.stop().is_none());
    }

    #[test]
    fn start_is_noop_when_goal_already_met() {
        let mut timer = meditation(60, 60);
        assert!(timer.start_at(0).is_none());
        assert!(!timer.is_active());
    }

    #[test]
    fn stop_discards_partial_period() {
        let mut timer = meditation(0, 60);
        timer.start_at(0);
        timer.tick_at(MINUTE / 2);
        timer.stop();
        timer.start_at(MINUTE);
        assert!(timer.tick_at(MINUTE + MINUTE / 2).is_empty());
        assert_eq!(timer.value(), 0);
    }

    #[test]
    fn huge_period_saturates() {
        let timer = ActivityTimer::new(
            MentalHealthMetric::Meditation.into(),
            0,
            60,
            Duration::MAX,
        );
        assert_eq!(timer.period(), Duration::from_millis(u64::MAX));
        assert_eq!(duration_ms(Duration::ZERO), 0);
    }

    #[test]
    fn idle_timer_ignores_ticks() {
        let mut timer = meditation(0, 60);
        assert!(timer.tick_at(MINUTE * 5).is_empty());
        assert_eq!(timer.value(), 0);
    }
}
