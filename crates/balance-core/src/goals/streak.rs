//! Per-metric completion streaks.
//!
//! A streak counts consecutive completion events and remembers the best run
//! ever seen. There is no date gating: every recorded event counts, so callers
//! record at most one event per logical completion.

use serde::{Deserialize, Serialize};

/// Current and all-time-longest run for one metric.
///
/// Invariant: `longest >= current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Streak {
    current: u32,
    longest: u32,
}

impl Streak {
    /// Streak for a metric seeing its first completion event.
    pub fn first(did_complete: bool) -> Self {
        let n = u32::from(did_complete);
        Self {
            current: n,
            longest: n,
        }
    }

    /// Rebuild a streak from stored values.
    ///
    /// A stored `longest` smaller than `current` is raised to `current`.
    pub fn from_parts(current: u32, longest: u32) -> Self {
        Self {
            current,
            longest: longest.max(current),
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn longest(&self) -> u32 {
        self.longest
    }

    /// Apply one completion event.
    ///
    /// A completion extends the run; a miss resets `current` to zero and
    /// leaves `longest` alone.
    pub fn record(&mut self, did_complete: bool) {
        if did_complete {
            self.current = self.current.saturating_add(1);
            self.longest = self.longest.max(self.current);
        } else {
            self.current = 0;
        }
    }
}

/// Streak after one event, starting from an optional existing entry.
pub fn advance(existing: Option<Streak>, did_complete: bool) -> Streak {
    match existing {
        None => Streak::first(did_complete),
        Some(mut streak) => {
            streak.record(did_complete);
            streak
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_event_seeds_entry() {
        assert_eq!(advance(None, true), Streak::from_parts(1, 1));
        assert_eq!(advance(None, false), Streak::from_parts(0, 0));
    }

    #[test]
    fn meditation_scenario() {
        let mut streak = None;
        for _ in 0..3 {
            streak = Some(advance(streak, true));
        }
        assert_eq!(streak, Some(Streak::from_parts(3, 3)));

        streak = Some(advance(streak, false));
        assert_eq!(streak, Some(Streak::from_parts(0, 3)));

        streak = Some(advance(streak, true));
        assert_eq!(streak, Some(Streak::from_parts(1, 3)));
    }

    #[test]
    fn repeated_misses_stay_at_zero() {
        let mut streak = Streak::from_parts(4, 9);
        streak.record(false);
        streak.record(false);
        assert_eq!(streak.current(), 0);
        assert_eq!(streak.longest(), 9);
    }

    #[test]
    fn from_parts_repairs_inverted_values() {
        let streak = Streak::from_parts(5, 2);
        assert_eq!(streak.longest(), 5);
    }

    proptest! {
        #[test]
        fn longest_tracks_max_current(events in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut streak: Option<Streak> = None;
            let mut max_seen = 0;
            let mut prev_longest = 0;
            for did_complete in events {
                let next = advance(streak, did_complete);
                max_seen = max_seen.max(next.current());
                prop_assert_eq!(next.longest(), max_seen);
                prop_assert!(next.longest() >= prev_longest);
                prop_assert!(next.longest() >= next.current());
                prev_longest = next.longest();
                streak = Some(next);
            }
        }

        #[test]
        fn miss_resets_current_only(current in 0u32..1000, extra in 0u32..1000) {
            let mut streak = Streak::from_parts(current, current + extra);
            let longest = streak.longest();
            streak.record(false);
            prop_assert_eq!(streak.current(), 0);
            prop_assert_eq!(streak.longest(), longest);
        }
    }
}
