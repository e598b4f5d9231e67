mod config;
pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use config::{Config, HealthConfig, ProgressConfig, TargetsConfig, TimerConfig};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::path::PathBuf;
use uuid::Uuid;

use crate::error::{ConfigError, Result};
use crate::goals::{CustomGoal, CustomGoalsRecord, FitnessRecord, MentalHealthRecord};

/// Borrowed view of everything the goal store holds in memory.
///
/// Absent entities are skipped on save.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityGraph<'a> {
    pub fitness: Option<&'a FitnessRecord>,
    pub mental_health: Option<&'a MentalHealthRecord>,
    pub custom_goals: Option<&'a CustomGoalsRecord>,
}

/// Durable object storage the goal store sits on.
///
/// Inserts and deletes are staged and only become durable with the next
/// successful [`DurableStore::save`], which commits them together with the
/// entity graph in one transaction.
pub trait DurableStore {
    fn fetch_fitness(&self) -> Result<Option<FitnessRecord>>;

    fn fetch_mental_health(&self) -> Result<Option<MentalHealthRecord>>;

    /// The container record with its goals attached.
    fn fetch_custom_goals(&self) -> Result<Option<CustomGoalsRecord>>;

    fn insert_custom_goal(&mut self, goal: &CustomGoal) -> Result<()>;

    fn delete_custom_goal(&mut self, id: Uuid) -> Result<()>;

    fn save(&mut self, graph: &EntityGraph<'_>) -> Result<()>;

    /// Drop inserts and deletes that no save has committed yet.
    fn discard_staged(&mut self);

    /// Remove every record and goal. Takes effect immediately.
    fn wipe(&mut self) -> Result<()>;
}

/// Returns the Balance data directory.
///
/// `BALANCE_DATA_DIR` wins when set. Otherwise `~/.config/balance[-dev]/`,
/// chosen by `BALANCE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("BALANCE_DATA_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("BALANCE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("balance-dev")
            } else {
                base_dir.join("balance")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
