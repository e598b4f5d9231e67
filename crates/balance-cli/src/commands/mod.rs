pub mod config;
pub mod goal;
pub mod health;
pub mod metric;
pub mod onboard;
pub mod reset;
pub mod status;
pub mod streak;
pub mod timer;

use balance_core::{CoreError, GoalStore, MetricKey, SqliteStore, Streak};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the store in the data directory, creating default records on first use.
pub fn open_store() -> Result<GoalStore<SqliteStore>, CoreError> {
    GoalStore::open(SqliteStore::open()?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Persist a new metric value and record one streak event for it.
pub fn record_metric(
    store: &mut GoalStore<SqliteStore>,
    key: MetricKey,
    value: u32,
    target: u32,
) -> Result<Option<Streak>, CoreError> {
    store.set_metric(key, value)?;
    store.update_streak(key, value >= target)
}

pub fn percent(ratio: f64) -> u32 {
    (ratio * 100.0).round() as u32
}
