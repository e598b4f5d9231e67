//! The goal store: in-memory mirror of every durable entity.
//!
//! All reads go through the store and every mutation is followed by a save.
//! Saves return their result; a failed save leaves the in-memory state ahead
//! of durable storage and nothing is retried.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = GoalStore::open(SqliteStore::open()?)?;
//! store.set_metric(FitnessMetric::Water.into(), 2)?;
//! store.update_streak(FitnessMetric::Water.into(), false)?;
//! ```

use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::{Result, ValidationError};
use crate::events::StoreEvent;
use crate::goals::{
    CustomGoal, CustomGoalsRecord, FitnessRecord, MentalHealthRecord, MetricKey, Streak,
};
use crate::storage::{DurableStore, EntityGraph};

const EVENT_CAPACITY: usize = 64;

pub struct GoalStore<S: DurableStore> {
    durable: S,
    fitness: Option<FitnessRecord>,
    mental_health: Option<MentalHealthRecord>,
    custom_goals: Option<CustomGoalsRecord>,
    events: broadcast::Sender<StoreEvent>,
}

impl<S: DurableStore> GoalStore<S> {
    /// Wrap a durable store and make sure every record exists.
    ///
    /// # Errors
    /// Returns an error if a record can neither be fetched nor created.
    pub fn open(durable: S) -> Result<Self> {
        let mut store = Self::detached(durable);
        store.initialize()?;
        Ok(store)
    }

    /// Wrap a durable store without touching it. Every entity starts absent.
    pub fn detached(durable: S) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            durable,
            fitness: None,
            mental_health: None,
            custom_goals: None,
            events,
        }
    }

    /// Fetch every record, creating and persisting defaults for missing ones.
    pub fn initialize(&mut self) -> Result<()> {
        let mut created = false;

        if self.fitness.is_none() {
            self.fitness = Some(match self.durable.fetch_fitness()? {
                Some(record) => record,
                None => {
                    created = true;
                    FitnessRecord::new()
                }
            });
        }
        if self.mental_health.is_none() {
            self.mental_health = Some(match self.durable.fetch_mental_health()? {
                Some(record) => record,
                None => {
                    created = true;
                    MentalHealthRecord::new()
                }
            });
        }
        if self.custom_goals.is_none() {
            self.custom_goals = Some(match self.durable.fetch_custom_goals()? {
                Some(record) => record,
                None => {
                    created = true;
                    CustomGoalsRecord::new()
                }
            });
        }

        if created {
            tracing::info!("created default records");
            self.save()?;
        }
        self.emit(StoreEvent::Loaded { at: Utc::now() });
        Ok(())
    }

    /// Re-fetch every entity from durable storage.
    ///
    /// Goal inserts and deletes that never reached a successful save are
    /// dropped. A failed fetch is logged and leaves that entity absent. Missing
    /// records are not created here; see [`GoalStore::initialize`].
    pub fn load(&mut self) {
        self.durable.discard_staged();
        self.fitness = self
            .durable
            .fetch_fitness()
            .unwrap_or_else(|e| log_load_failure("fitness", e));
        self.mental_health = self
            .durable
            .fetch_mental_health()
            .unwrap_or_else(|e| log_load_failure("mental_health", e));
        self.custom_goals = self
            .durable
            .fetch_custom_goals()
            .unwrap_or_else(|e| log_load_failure("custom_goals", e));
        self.emit(StoreEvent::Loaded { at: Utc::now() });
    }

    /// Commit the whole in-memory graph in one transaction.
    pub fn save(&mut self) -> Result<()> {
        let graph = EntityGraph {
            fitness: self.fitness.as_ref(),
            mental_health: self.mental_health.as_ref(),
            custom_goals: self.custom_goals.as_ref(),
        };
        match self.durable.save(&graph) {
            Ok(()) => {
                tracing::debug!("saved entity graph");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to save entity graph");
                Err(e)
            }
        }
    }

    /// Receive a [`StoreEvent`] for every in-memory change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn fitness(&self) -> Option<&FitnessRecord> {
        self.fitness.as_ref()
    }

    pub fn mental_health(&self) -> Option<&MentalHealthRecord> {
        self.mental_health.as_ref()
    }

    pub fn custom_goals_record(&self) -> Option<&CustomGoalsRecord> {
        self.custom_goals.as_ref()
    }

    /// Custom goals in creation order; empty when the container is absent.
    pub fn custom_goals(&self) -> &[CustomGoal] {
        self.custom_goals
            .as_ref()
            .map(|c| c.goals())
            .unwrap_or_default()
    }

    pub fn custom_goal(&self, id: Uuid) -> Option<&CustomGoal> {
        self.custom_goals.as_ref()?.goal(id)
    }

    /// Current value of a metric; `None` when its record is absent.
    pub fn metric(&self, key: MetricKey) -> Option<u32> {
        match key {
            MetricKey::Fitness(m) => self.fitness.as_ref().map(|r| r.value(m)),
            MetricKey::MentalHealth(m) => self.mental_health.as_ref().map(|r| r.value(m)),
        }
    }

    pub fn is_tracked(&self, key: MetricKey) -> bool {
        match key {
            MetricKey::Fitness(m) => self.fitness.as_ref().is_some_and(|r| r.is_tracked(m)),
            MetricKey::MentalHealth(m) => {
                self.mental_health.as_ref().is_some_and(|r| r.is_tracked(m))
            }
        }
    }

    pub fn fetch_streak(&self, key: MetricKey) -> Option<Streak> {
        match key {
            MetricKey::Fitness(m) => self.fitness.as_ref()?.streak(m),
            MetricKey::MentalHealth(m) => self.mental_health.as_ref()?.streak(m),
        }
    }

    /// Absent container reads as not onboarded.
    pub fn is_onboarding_completed(&self) -> bool {
        self.custom_goals
            .as_ref()
            .is_some_and(|c| c.is_onboarding_complete)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Overwrite one metric value, then save.
    ///
    /// Returns `Ok(false)` without saving when the owning record is absent.
    pub fn set_metric(&mut self, key: MetricKey, value: u32) -> Result<bool> {
        let applied = match key {
            MetricKey::Fitness(m) => self.fitness.as_mut().map(|r| r.set_value(m, value)),
            MetricKey::MentalHealth(m) => {
                self.mental_health.as_mut().map(|r| r.set_value(m, value))
            }
        };
        if applied.is_none() {
            log_absent(key.category().as_str(), "set_metric");
            return Ok(false);
        }
        self.emit(StoreEvent::MetricChanged {
            metric: key,
            value,
            at: Utc::now(),
        });
        self.save()?;
        Ok(true)
    }

    /// Record one completion event for a metric's streak, then save.
    ///
    /// Every call counts; callers invoke this once per logical completion.
    pub fn update_streak(&mut self, key: MetricKey, did_complete: bool) -> Result<Option<Streak>> {
        let streak = match key {
            MetricKey::Fitness(m) => self
                .fitness
                .as_mut()
                .map(|r| r.record_completion(m, did_complete)),
            MetricKey::MentalHealth(m) => self
                .mental_health
                .as_mut()
                .map(|r| r.record_completion(m, did_complete)),
        };
        let Some(streak) = streak else {
            log_absent(key.category().as_str(), "update_streak");
            return Ok(None);
        };
        tracing::debug!(
            metric = %key,
            did_complete,
            current = streak.current(),
            longest = streak.longest(),
            "streak updated"
        );
        self.emit(StoreEvent::StreakUpdated {
            metric: key,
            streak,
            at: Utc::now(),
        });
        self.save()?;
        Ok(Some(streak))
    }

    /// Select or deselect a metric for tracking, then save.
    pub fn set_tracked(&mut self, key: MetricKey, tracked: bool) -> Result<bool> {
        let applied = match key {
            MetricKey::Fitness(m) => self.fitness.as_mut().map(|r| r.set_tracked(m, tracked)),
            MetricKey::MentalHealth(m) => self
                .mental_health
                .as_mut()
                .map(|r| r.set_tracked(m, tracked)),
        };
        if applied.is_none() {
            log_absent(key.category().as_str(), "set_tracked");
            return Ok(false);
        }
        self.emit(StoreEvent::TrackingChanged {
            metric: key,
            tracked,
            at: Utc::now(),
        });
        self.save()?;
        Ok(true)
    }

    /// Create a goal with zero progress, attach it to the container, save.
    ///
    /// Returns `Ok(None)` when the container is absent.
    ///
    /// # Errors
    /// Rejects a blank name or a zero target before touching any state.
    pub fn add_custom_goal(
        &mut self,
        name: &str,
        target: u32,
        is_checkable: bool,
    ) -> Result<Option<CustomGoal>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if target == 0 {
            return Err(ValidationError::NonPositiveTarget.into());
        }
        let Some(container) = self.custom_goals.as_mut() else {
            log_absent("custom_goals", "add_custom_goal");
            return Ok(None);
        };

        let goal = CustomGoal::new(name, target, is_checkable);
        container.attach(goal.clone());
        self.durable.insert_custom_goal(&goal)?;
        tracing::info!(id = %goal.id, name = %goal.name, target, "custom goal added");
        self.emit(StoreEvent::CustomGoalAdded {
            id: goal.id,
            at: Utc::now(),
        });
        self.save()?;
        Ok(Some(goal))
    }

    /// Remove a goal from storage and from its container, then save.
    ///
    /// Returns `Ok(false)` for an unknown id or an absent container.
    pub fn delete_custom_goal(&mut self, id: Uuid) -> Result<bool> {
        let Some(container) = self.custom_goals.as_mut() else {
            log_absent("custom_goals", "delete_custom_goal");
            return Ok(false);
        };
        if container.detach(id).is_none() {
            return Ok(false);
        }
        self.durable.delete_custom_goal(id)?;
        tracing::info!(%id, "custom goal deleted");
        self.emit(StoreEvent::CustomGoalDeleted { id, at: Utc::now() });
        self.save()?;
        Ok(true)
    }

    /// Overwrite a goal's progress, then save.
    ///
    /// Returns the updated goal, or `Ok(None)` for an unknown id.
    pub fn set_custom_goal_progress(&mut self, id: Uuid, progress: u32) -> Result<Option<CustomGoal>> {
        let Some(goal) = self.custom_goals.as_mut().and_then(|c| c.goal_mut(id)) else {
            return Ok(None);
        };
        goal.progress = progress;
        let goal = goal.clone();
        self.emit(StoreEvent::CustomGoalProgressChanged {
            id,
            progress,
            completed: goal.is_completed(),
            at: Utc::now(),
        });
        self.save()?;
        Ok(Some(goal))
    }

    /// Mark onboarding as done. There is no way back short of
    /// [`GoalStore::reset_all_data`].
    pub fn complete_onboarding(&mut self) -> Result<bool> {
        let Some(container) = self.custom_goals.as_mut() else {
            log_absent("custom_goals", "complete_onboarding");
            return Ok(false);
        };
        container.is_onboarding_complete = true;
        self.emit(StoreEvent::OnboardingCompleted { at: Utc::now() });
        self.save()?;
        Ok(true)
    }

    /// Wipe every record and goal, then recreate default records.
    pub fn reset_all_data(&mut self) -> Result<()> {
        self.durable.wipe()?;
        self.fitness = None;
        self.mental_health = None;
        self.custom_goals = None;
        tracing::warn!("all data reset");
        self.emit(StoreEvent::DataReset { at: Utc::now() });
        self.initialize()
    }

    pub fn durable(&self) -> &S {
        &self.durable
    }

    pub fn durable_mut(&mut self) -> &mut S {
        &mut self.durable
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn log_load_failure<T>(entity: &str, err: crate::error::CoreError) -> Option<T> {
    tracing::error!(entity, error = %err, "failed to load entity");
    None
}

fn log_absent(entity: &str, operation: &str) {
    tracing::warn!(entity, operation, "entity not loaded, ignoring");
}
