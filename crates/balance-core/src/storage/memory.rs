//! In-memory durable store for tests and previews.
//!
//! Saves and loads can be made to fail on demand so the goal store's
//! failure handling can be exercised without a real database.

use uuid::Uuid;

use super::{DurableStore, EntityGraph};
use crate::error::{DatabaseError, Result};
use crate::goals::{CustomGoal, CustomGoalsRecord, FitnessRecord, MentalHealthRecord};

#[derive(Debug, Default)]
pub struct MemoryStore {
    fitness: Option<FitnessRecord>,
    mental_health: Option<MentalHealthRecord>,
    custom_goals: Option<CustomGoalsRecord>,
    staged_inserts: Vec<CustomGoal>,
    staged_deletes: Vec<Uuid>,
    fail_saves: bool,
    fail_loads: bool,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail until turned off again.
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// Make every subsequent fetch fail until turned off again.
    pub fn set_fail_loads(&mut self, fail: bool) {
        self.fail_loads = fail;
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    fn check_load(&self) -> Result<()> {
        if self.fail_loads {
            return Err(DatabaseError::QueryFailed("injected load failure".into()).into());
        }
        Ok(())
    }
}

impl DurableStore for MemoryStore {
    fn fetch_fitness(&self) -> Result<Option<FitnessRecord>> {
        self.check_load()?;
        Ok(self.fitness.clone())
    }

    fn fetch_mental_health(&self) -> Result<Option<MentalHealthRecord>> {
        self.check_load()?;
        Ok(self.mental_health.clone())
    }

    fn fetch_custom_goals(&self) -> Result<Option<CustomGoalsRecord>> {
        self.check_load()?;
        Ok(self.custom_goals.clone())
    }

    fn insert_custom_goal(&mut self, goal: &CustomGoal) -> Result<()> {
        self.staged_inserts.push(goal.clone());
        Ok(())
    }

    fn delete_custom_goal(&mut self, id: Uuid) -> Result<()> {
        self.staged_deletes.push(id);
        Ok(())
    }

    fn save(&mut self, graph: &EntityGraph<'_>) -> Result<()> {
        if self.fail_saves {
            return Err(DatabaseError::SaveFailed("injected save failure".into()).into());
        }

        if let Some(record) = graph.fitness {
            self.fitness = Some(record.clone());
        }
        if let Some(record) = graph.mental_health {
            self.mental_health = Some(record.clone());
        }
        if let Some(container) = graph.custom_goals {
            let mut stored = container.clone();
            for goal in self.staged_inserts.drain(..) {
                if stored.goal(goal.id).is_none() {
                    stored.attach(goal);
                }
            }
            for id in self.staged_deletes.drain(..) {
                stored.detach(id);
            }
            self.custom_goals = Some(stored);
        }

        self.saves += 1;
        Ok(())
    }

    fn discard_staged(&mut self) {
        self.staged_inserts.clear();
        self.staged_deletes.clear();
    }

    fn wipe(&mut self) -> Result<()> {
        self.fitness = None;
        self.mental_health = None;
        self.custom_goals = None;
        self.staged_inserts.clear();
        self.staged_deletes.clear();
        Ok(())
    }
}
