//! Closed enumerations of the tracked metrics.
//!
//! Every metric belongs to exactly one [`Category`] and has a stable string
//! key used by storage and the CLI.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Goal domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Fitness,
    MentalHealth,
    Custom,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fitness => "fitness",
            Category::MentalHealth => "mental_health",
            Category::Custom => "custom",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fitness" => Ok(Category::Fitness),
            "mental_health" | "mental" => Ok(Category::MentalHealth),
            "custom" => Ok(Category::Custom),
            other => Err(ValidationError::UnknownCategory(other.to_string())),
        }
    }
}

/// How a front end is expected to move a metric forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    /// Each action adds a fixed step.
    Increment,
    /// A single action marks the goal as done for the day.
    Check,
    /// A countup timer adds one unit per elapsed minute.
    Timed,
    /// Populated from the health data provider, displayed read-only.
    HealthSynced,
}

/// Behaviour shared by the per-category metric enums.
pub trait Metric:
    Copy + Ord + Eq + std::hash::Hash + fmt::Debug + Serialize + DeserializeOwned + 'static
{
    /// Category whose record owns this metric.
    const CATEGORY: Category;

    /// Every variant, in display order.
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;
    fn label(&self) -> &'static str;
    fn unit(&self) -> &'static str;
    fn default_target(&self) -> u32;
    fn mode(&self) -> TrackingMode;
    fn key(self) -> MetricKey;

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessMetric {
    Steps,
    Calories,
    Workout,
    Water,
    Stretching,
}

impl Metric for FitnessMetric {
    const CATEGORY: Category = Category::Fitness;
    const ALL: &'static [Self] = &[
        FitnessMetric::Steps,
        FitnessMetric::Calories,
        FitnessMetric::Workout,
        FitnessMetric::Water,
        FitnessMetric::Stretching,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            FitnessMetric::Steps => "steps",
            FitnessMetric::Calories => "calories",
            FitnessMetric::Workout => "workout",
            FitnessMetric::Water => "water",
            FitnessMetric::Stretching => "stretching",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            FitnessMetric::Steps => "Steps",
            FitnessMetric::Calories => "Calories",
            FitnessMetric::Workout => "Workout",
            FitnessMetric::Water => "Water Intake",
            FitnessMetric::Stretching => "Daily Stretching",
        }
    }

    fn unit(&self) -> &'static str {
        match self {
            FitnessMetric::Steps => "steps",
            FitnessMetric::Calories => "kcal",
            FitnessMetric::Water => "units",
            FitnessMetric::Workout | FitnessMetric::Stretching => "min",
        }
    }

    fn default_target(&self) -> u32 {
        match self {
            FitnessMetric::Steps => 10_000,
            FitnessMetric::Calories => 2000,
            FitnessMetric::Workout => 30,
            FitnessMetric::Water => 4,
            FitnessMetric::Stretching => 15,
        }
    }

    fn mode(&self) -> TrackingMode {
        match self {
            FitnessMetric::Steps | FitnessMetric::Calories | FitnessMetric::Workout => {
                TrackingMode::HealthSynced
            }
            FitnessMetric::Water => TrackingMode::Check,
            FitnessMetric::Stretching => TrackingMode::Timed,
        }
    }

    fn key(self) -> MetricKey {
        MetricKey::Fitness(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentalHealthMetric {
    Meditation,
    Outdoor,
    FamilyCall,
    MindfulBreathing,
    ScreenOff,
}

impl Metric for MentalHealthMetric {
    const CATEGORY: Category = Category::MentalHealth;
    const ALL: &'static [Self] = &[
        MentalHealthMetric::Meditation,
        MentalHealthMetric::Outdoor,
        MentalHealthMetric::FamilyCall,
        MentalHealthMetric::MindfulBreathing,
        MentalHealthMetric::ScreenOff,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            MentalHealthMetric::Meditation => "meditation",
            MentalHealthMetric::Outdoor => "outdoor",
            MentalHealthMetric::FamilyCall => "family_call",
            MentalHealthMetric::MindfulBreathing => "mindful_breathing",
            MentalHealthMetric::ScreenOff => "screen_off",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            MentalHealthMetric::Meditation => "Daily Meditation",
            MentalHealthMetric::Outdoor => "Fresh Air",
            MentalHealthMetric::FamilyCall => "Family Calls",
            MentalHealthMetric::MindfulBreathing => "Mindful Breathing",
            MentalHealthMetric::ScreenOff => "Screen-Off Time",
        }
    }

    fn unit(&self) -> &'static str {
        "min"
    }

    fn default_target(&self) -> u32 {
        match self {
            MentalHealthMetric::Meditation => 60,
            MentalHealthMetric::Outdoor => 60,
            MentalHealthMetric::FamilyCall => 30,
            MentalHealthMetric::MindfulBreathing => 20,
            MentalHealthMetric::ScreenOff => 90,
        }
    }

    fn mode(&self) -> TrackingMode {
        match self {
            MentalHealthMetric::Meditation => TrackingMode::Timed,
            _ => TrackingMode::Check,
        }
    }

    fn key(self) -> MetricKey {
        MetricKey::MentalHealth(self)
    }
}

/// A metric from either built-in category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricKey {
    Fitness(FitnessMetric),
    MentalHealth(MentalHealthMetric),
}

impl MetricKey {
    /// Every built-in metric, fitness first.
    pub fn all() -> impl Iterator<Item = MetricKey> {
        FitnessMetric::ALL
            .iter()
            .map(|m| m.key())
            .chain(MentalHealthMetric::ALL.iter().map(|m| m.key()))
    }

    pub fn category(&self) -> Category {
        match self {
            MetricKey::Fitness(_) => Category::Fitness,
            MetricKey::MentalHealth(_) => Category::MentalHealth,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::Fitness(m) => m.as_str(),
            MetricKey::MentalHealth(m) => m.as_str(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricKey::Fitness(m) => m.label(),
            MetricKey::MentalHealth(m) => m.label(),
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKey::Fitness(m) => m.unit(),
            MetricKey::MentalHealth(m) => m.unit(),
        }
    }

    pub fn default_target(&self) -> u32 {
        match self {
            MetricKey::Fitness(m) => m.default_target(),
            MetricKey::MentalHealth(m) => m.default_target(),
        }
    }

    pub fn mode(&self) -> TrackingMode {
        match self {
            MetricKey::Fitness(m) => m.mode(),
            MetricKey::MentalHealth(m) => m.mode(),
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FitnessMetric::parse(s)
            .map(MetricKey::Fitness)
            .or_else(|| MentalHealthMetric::parse(s).map(MetricKey::MentalHealth))
            .ok_or_else(|| ValidationError::UnknownMetric(s.to_string()))
    }
}

impl From<FitnessMetric> for MetricKey {
    fn from(m: FitnessMetric) -> Self {
        MetricKey::Fitness(m)
    }
}

impl From<MentalHealthMetric> for MetricKey {
    fn from(m: MentalHealthMetric) -> Self {
        MetricKey::MentalHealth(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_strings() {
        for key in MetricKey::all() {
            assert_eq!(key.as_str().parse::<MetricKey>().unwrap(), key);
        }
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = "waterIntake".parse::<MetricKey>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownMetric("waterIntake".into()));
    }

    #[test]
    fn key_reports_owning_category() {
        assert_eq!(MetricKey::from(FitnessMetric::Water).category(), Category::Fitness);
        assert_eq!(
            MetricKey::from(MentalHealthMetric::Meditation).category(),
            Category::MentalHealth
        );
    }

    #[test]
    fn timed_metrics_are_meditation_and_stretching() {
        let timed: Vec<_> = MetricKey::all()
            .filter(|k| k.mode() == TrackingMode::Timed)
            .map(|k| k.as_str())
            .collect();
        assert_eq!(timed, vec!["stretching", "meditation"]);
    }

    #[test]
    fn category_parses_short_alias() {
        assert_eq!("mental".parse::<Category>().unwrap(), Category::MentalHealth);
        assert!("sleep".parse::<Category>().is_err());
    }
}
