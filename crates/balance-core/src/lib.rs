//! # Balance Core Library
//!
//! Core logic for Balance, a daily wellness tracker covering fitness, mental
//! health and user-defined goals. Every operation is available through the
//! `balance` CLI binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Goals**: typed metric catalogue, per-category records, custom goals,
//!   streak and progress rules
//! - **Store**: [`GoalStore`] keeps the in-memory entity graph and commits it
//!   after every mutation
//! - **Storage**: SQLite persistence with schema migrations, and TOML
//!   configuration
//! - **Timer**: wall-clock countup for timed activities; the caller drives
//!   `tick()`
//! - **Health**: read-only health platform queries for display
//!
//! ## Key Components
//!
//! - [`GoalStore`]: reads and mutations over every durable entity
//! - [`SqliteStore`]: durable storage
//! - [`Config`]: targets and tunables
//! - [`ActivityTimer`]: timed-activity state machine
//! - [`HealthDataSource`]: trait for health platforms

pub mod error;
pub mod events;
pub mod goals;
pub mod health;
pub mod storage;
pub mod store;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, HealthError, ValidationError};
pub use events::StoreEvent;
pub use goals::{
    Category, CustomGoal, CustomGoalsRecord, FitnessMetric, FitnessRecord, GoalAction,
    MentalHealthMetric, MentalHealthRecord, Metric, MetricKey, Streak, TrackingMode,
};
pub use health::{
    fetch_today, HealthDataSource, HealthSnapshot, JsonFileHealthSource, StaticHealthSource,
    UnavailableHealthSource,
};
pub use storage::{Config, DurableStore, MemoryStore, SqliteStore};
pub use store::GoalStore;
pub use timer::{spawn_ticker, ActivityTimer, TickerHandle, TimerEvent, TimerState};
