//! Goal data model: categories, metrics, records, streaks and progress rules.

mod metric;
pub mod progress;
mod record;
mod streak;

pub use metric::{Category, FitnessMetric, MentalHealthMetric, Metric, MetricKey, TrackingMode};
pub use progress::GoalAction;
pub use record::{
    CategoryRecord, CustomGoal, CustomGoalsRecord, FitnessRecord, MentalHealthRecord,
};
pub use streak::Streak;
