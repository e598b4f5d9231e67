//! Integration tests for the goal store over SQLite.

use std::time::Duration;

use balance_core::goals::progress::{self, GoalAction};
use balance_core::{
    ActivityTimer, Config, FitnessMetric, GoalStore, MentalHealthMetric, MetricKey, SqliteStore,
    Streak, TimerEvent,
};

fn open(path: &std::path::Path) -> GoalStore<SqliteStore> {
    GoalStore::open(SqliteStore::open_at(path).unwrap()).unwrap()
}

#[test]
fn test_onboarding_then_daily_use() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("balance.db");
    let config = Config::default();

    {
        let mut store = open(&db);
        assert!(!store.is_onboarding_completed());

        // Onboarding: pick metrics and a custom goal.
        store.set_tracked(FitnessMetric::Water.into(), true).unwrap();
        store.set_tracked(MentalHealthMetric::Outdoor.into(), true).unwrap();
        store.add_custom_goal("Read", 30, false).unwrap().unwrap();
        store.complete_onboarding().unwrap();
    }

    let mut store = open(&db);
    assert!(store.is_onboarding_completed());

    // Tap the water row four times; each tap records one streak event.
    let water: MetricKey = FitnessMetric::Water.into();
    let target = config.target(water);
    for _ in 0..target {
        let current = store.metric(water).unwrap();
        let next = progress::apply(current, target, GoalAction::Increment(1));
        store.set_metric(water, next).unwrap();
        store
            .update_streak(water, progress::is_complete(next, target))
            .unwrap();
    }
    assert_eq!(store.metric(water), Some(4));
    // Three misses then a hit.
    assert_eq!(store.fetch_streak(water), Some(Streak::from_parts(1, 1)));

    let fitness = store.fitness().unwrap();
    let overview = progress::category_overview(fitness, |m| config.target(m.into()));
    assert!((overview - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_custom_goal_progress_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("balance.db");

    let (read, walk) = {
        let mut store = open(&db);
        let read = store.add_custom_goal("Read", 60, false).unwrap().unwrap();
        let walk = store.add_custom_goal("Walk the dog", 1, true).unwrap().unwrap();
        store.set_custom_goal_progress(read.id, 30).unwrap();
        store.set_custom_goal_progress(walk.id, 1).unwrap();
        (read.id, walk.id)
    };

    let mut store = open(&db);
    let goals = store.custom_goals();
    assert_eq!(goals.len(), 2);
    assert_eq!(goals[0].id, read);
    assert_eq!(goals[0].progress, 30);
    assert!(goals[1].is_completed());
    assert!((progress::custom_overview(goals) - 0.75).abs() < 1e-9);

    assert!(store.delete_custom_goal(walk).unwrap());
    drop(store);

    let store = open(&db);
    assert_eq!(store.custom_goals().len(), 1);
    assert!(store.custom_goal(walk).is_none());
}

#[test]
fn test_timer_drives_meditation_progress() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(&dir.path().join("balance.db"));
    let meditation: MetricKey = MentalHealthMetric::Meditation.into();
    store.set_metric(meditation, 57).unwrap();

    let mut timer = ActivityTimer::new(
        meditation,
        store.metric(meditation).unwrap(),
        60,
        Duration::from_secs(60),
    );
    timer.start_at(0);

    let mut reached = 0;
    for minute in 1..=10u64 {
        for event in timer.tick_at(minute * 60_000) {
            match event {
                TimerEvent::Increment { metric, value, .. } => {
                    store.set_metric(metric, value).unwrap();
                    store.update_streak(metric, value >= 60).unwrap();
                }
                TimerEvent::GoalReached { .. } => reached += 1,
                _ => {}
            }
        }
    }

    assert_eq!(reached, 1);
    assert_eq!(store.metric(meditation), Some(60));
    assert_eq!(store.fetch_streak(meditation), Some(Streak::from_parts(1, 1)));
    assert!(!timer.is_active());
}

#[test]
fn test_reset_all_data_starts_over() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("balance.db");
    {
        let mut store = open(&db);
        store.complete_onboarding().unwrap();
        store.add_custom_goal("Read", 60, false).unwrap();
        store.set_metric(FitnessMetric::Steps.into(), 5000).unwrap();
        store.reset_all_data().unwrap();
    }

    let store = open(&db);
    assert!(!store.is_onboarding_completed());
    assert!(store.custom_goals().is_empty());
    assert_eq!(store.metric(FitnessMetric::Steps.into()), Some(0));
}
