//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Daily targets for every built-in metric
//! - Timed activity tick length
//! - Health data source settings
//! - Increment step for counter goals
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::goals::{FitnessMetric, MentalHealthMetric, Metric, MetricKey};

/// Daily target per metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetsConfig {
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default = "default_calories")]
    pub calories: u32,
    #[serde(default = "default_workout")]
    pub workout: u32,
    #[serde(default = "default_water")]
    pub water: u32,
    #[serde(default = "default_stretching")]
    pub stretching: u32,
    #[serde(default = "default_meditation")]
    pub meditation: u32,
    #[serde(default = "default_outdoor")]
    pub outdoor: u32,
    #[serde(default = "default_family_call")]
    pub family_call: u32,
    #[serde(default = "default_mindful_breathing")]
    pub mindful_breathing: u32,
    #[serde(default = "default_screen_off")]
    pub screen_off: u32,
}

/// Timed activity configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Seconds per credited unit.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,
}

/// Health data source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// JSON file with today's totals (steps, active energy, exercise, sleep).
    #[serde(default)]
    pub export_path: Option<String>,
}

/// Counter goal configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_increment_step")]
    pub increment_step: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub targets: TargetsConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
}

fn default_steps() -> u32 {
    FitnessMetric::Steps.default_target()
}
fn default_calories() -> u32 {
    FitnessMetric::Calories.default_target()
}
fn default_workout() -> u32 {
    FitnessMetric::Workout.default_target()
}
fn default_water() -> u32 {
    FitnessMetric::Water.default_target()
}
fn default_stretching() -> u32 {
    FitnessMetric::Stretching.default_target()
}
fn default_meditation() -> u32 {
    MentalHealthMetric::Meditation.default_target()
}
fn default_outdoor() -> u32 {
    MentalHealthMetric::Outdoor.default_target()
}
fn default_family_call() -> u32 {
    MentalHealthMetric::FamilyCall.default_target()
}
fn default_mindful_breathing() -> u32 {
    MentalHealthMetric::MindfulBreathing.default_target()
}
fn default_screen_off() -> u32 {
    MentalHealthMetric::ScreenOff.default_target()
}
fn default_tick_seconds() -> u64 {
    60
}
fn default_true() -> bool {
    true
}
fn default_increment_step() -> u32 {
    1
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            calories: default_calories(),
            workout: default_workout(),
            water: default_water(),
            stretching: default_stretching(),
            meditation: default_meditation(),
            outdoor: default_outdoor(),
            family_call: default_family_call(),
            mindful_breathing: default_mindful_breathing(),
            screen_off: default_screen_off(),
        }
    }
}

impl TargetsConfig {
    pub fn get(&self, key: MetricKey) -> u32 {
        match key {
            MetricKey::Fitness(m) => match m {
                FitnessMetric::Steps => self.steps,
                FitnessMetric::Calories => self.calories,
                FitnessMetric::Workout => self.workout,
                FitnessMetric::Water => self.water,
                FitnessMetric::Stretching => self.stretching,
            },
            MetricKey::MentalHealth(m) => match m {
                MentalHealthMetric::Meditation => self.meditation,
                MentalHealthMetric::Outdoor => self.outdoor,
                MentalHealthMetric::FamilyCall => self.family_call,
                MentalHealthMetric::MindfulBreathing => self.mindful_breathing,
                MentalHealthMetric::ScreenOff => self.screen_off,
            },
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_seconds: default_tick_seconds(),
        }
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            export_path: None,
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            increment_step: default_increment_step(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    // Optional strings serialize as null until first set.
                    serde_json::Value::Null if value.is_empty() => serde_json::Value::Null,
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Daily target for a metric.
    pub fn target(&self, key: MetricKey) -> u32 {
        self.targets.get(key)
    }

    /// Reject zero targets, zero-length ticks and zero increments.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in MetricKey::all() {
            if self.target(key) == 0 {
                return Err(ConfigError::InvalidValue {
                    key: format!("targets.{}", key.as_str()),
                    message: "target must be positive".into(),
                });
            }
        }
        if self.timer.tick_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.tick_seconds".into(),
                message: "tick must be at least one second".into(),
            });
        }
        if self.progress.increment_step == 0 {
            return Err(ConfigError::InvalidValue {
                key: "progress.increment_step".into(),
                message: "increment step must be positive".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[targets]\nwater = 8\n").unwrap();
        assert_eq!(parsed.targets.water, 8);
        assert_eq!(parsed.targets.meditation, 60);
        assert_eq!(parsed.timer.tick_seconds, 60);
    }

    #[test]
    fn targets_follow_metric_catalogue() {
        let cfg = Config::default();
        for key in MetricKey::all() {
            assert_eq!(cfg.target(key), key.default_target());
        }
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("targets.screen_off").as_deref(), Some("90"));
        assert_eq!(cfg.get("health.enabled").as_deref(), Some("true"));
        assert!(cfg.get("targets.sleep").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("targets.water", "6").unwrap();
        cfg.set("health.enabled", "false").unwrap();
        cfg.set("health.export_path", "/tmp/health.json").unwrap();
        assert_eq!(cfg.targets.water, 6);
        assert!(!cfg.health.enabled);
        assert_eq!(cfg.health.export_path.as_deref(), Some("/tmp/health.json"));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("targets.sleep", "480").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("health.enabled", "sometimes").is_err());
        assert!(cfg.set("targets.water", "lots").is_err());
    }

    #[test]
    fn set_rejects_zero_target_and_keeps_old_value() {
        let mut cfg = Config::default();
        assert!(cfg.set("targets.water", "0").is_err());
        assert_eq!(cfg.targets.water, 4);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("timer.tick_seconds", "1").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().timer.tick_seconds, 1);
    }
}
