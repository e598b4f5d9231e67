//! Read-only access to a health-data platform.
//!
//! Readings are cumulative totals since local midnight. They only feed the
//! display; nothing here touches durable progress or streaks.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::HealthError;

#[async_trait]
pub trait HealthDataSource: Send + Sync {
    /// Ask for read access to every quantity below.
    async fn request_authorization(&self) -> Result<(), HealthError>;

    async fn step_count(&self) -> Result<f64, HealthError>;

    /// Kilocalories.
    async fn active_energy_burned(&self) -> Result<f64, HealthError>;

    async fn exercise_minutes(&self) -> Result<f64, HealthError>;

    async fn sleep_minutes(&self) -> Result<f64, HealthError>;
}

/// Today's totals. A reading that could not be fetched stays `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub steps: Option<f64>,
    pub active_energy_kcal: Option<f64>,
    pub exercise_minutes: Option<f64>,
    pub sleep_minutes: Option<f64>,
}

impl HealthSnapshot {
    pub fn is_empty(&self) -> bool {
        self.steps.is_none()
            && self.active_energy_kcal.is_none()
            && self.exercise_minutes.is_none()
            && self.sleep_minutes.is_none()
    }
}

/// Authorize, then run the four queries concurrently.
///
/// Denied authorization yields an empty snapshot. Failures are logged, never
/// returned.
pub async fn fetch_today(source: &dyn HealthDataSource) -> HealthSnapshot {
    if let Err(e) = source.request_authorization().await {
        tracing::error!(error = %e, "health authorization failed");
        return HealthSnapshot::default();
    }

    let (steps, energy, exercise, sleep) = tokio::join!(
        source.step_count(),
        source.active_energy_burned(),
        source.exercise_minutes(),
        source.sleep_minutes(),
    );

    HealthSnapshot {
        steps: reading("steps", steps),
        active_energy_kcal: reading("active_energy", energy),
        exercise_minutes: reading("exercise", exercise),
        sleep_minutes: reading("sleep", sleep),
    }
}

fn reading(metric: &str, result: Result<f64, HealthError>) -> Option<f64> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(metric, error = %e, "health query failed");
            None
        }
    }
}

/// Fixed readings. A `None` field fails its query.
#[derive(Debug, Clone, Default)]
pub struct StaticHealthSource {
    pub authorized: bool,
    pub snapshot: HealthSnapshot,
}

impl StaticHealthSource {
    pub fn new(snapshot: HealthSnapshot) -> Self {
        Self {
            authorized: true,
            snapshot,
        }
    }

    pub fn denied() -> Self {
        Self::default()
    }

    fn get(&self, metric: &str, value: Option<f64>) -> Result<f64, HealthError> {
        value.ok_or_else(|| HealthError::QueryFailed {
            metric: metric.to_string(),
            message: "no samples".into(),
        })
    }
}

#[async_trait]
impl HealthDataSource for StaticHealthSource {
    async fn request_authorization(&self) -> Result<(), HealthError> {
        if self.authorized {
            Ok(())
        } else {
            Err(HealthError::AuthorizationDenied)
        }
    }

    async fn step_count(&self) -> Result<f64, HealthError> {
        self.get("steps", self.snapshot.steps)
    }

    async fn active_energy_burned(&self) -> Result<f64, HealthError> {
        self.get("active_energy", self.snapshot.active_energy_kcal)
    }

    async fn exercise_minutes(&self) -> Result<f64, HealthError> {
        self.get("exercise", self.snapshot.exercise_minutes)
    }

    async fn sleep_minutes(&self) -> Result<f64, HealthError> {
        self.get("sleep", self.snapshot.sleep_minutes)
    }
}

/// Platforms without a health store.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableHealthSource;

#[async_trait]
impl HealthDataSource for UnavailableHealthSource {
    async fn request_authorization(&self) -> Result<(), HealthError> {
        Err(HealthError::Unavailable)
    }

    async fn step_count(&self) -> Result<f64, HealthError> {
        Err(HealthError::Unavailable)
    }

    async fn active_energy_burned(&self) -> Result<f64, HealthError> {
        Err(HealthError::Unavailable)
    }

    async fn exercise_minutes(&self) -> Result<f64, HealthError> {
        Err(HealthError::Unavailable)
    }

    async fn sleep_minutes(&self) -> Result<f64, HealthError> {
        Err(HealthError::Unavailable)
    }
}

/// On-disk export of today's totals.
///
/// ```json
/// { "date": "2026-10-19", "steps": 8042, "active_energy_kcal": 410.5 }
/// ```
///
/// An export dated before today counts as zero for every quantity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthExport {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub steps: Option<f64>,
    #[serde(default)]
    pub active_energy_kcal: Option<f64>,
    #[serde(default)]
    pub exercise_minutes: Option<f64>,
    #[serde(default)]
    pub sleep_minutes: Option<f64>,
}

/// Reads a [`HealthExport`] file on every query.
#[derive(Debug, Clone)]
pub struct JsonFileHealthSource {
    path: PathBuf,
}

impl JsonFileHealthSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_export(&self, metric: &str) -> Result<HealthExport, HealthError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HealthError::Unavailable
            } else {
                query_failed(metric, e)
            }
        })?;
        serde_json::from_str(&content).map_err(|e| query_failed(metric, e))
    }

    async fn quantity(
        &self,
        metric: &str,
        pick: fn(&HealthExport) -> Option<f64>,
    ) -> Result<f64, HealthError> {
        let export = self.read_export(metric).await?;
        if export.date.is_some_and(|d| d < Local::now().date_naive()) {
            tracing::debug!(metric, path = %self.path.display(), "stale health export");
            return Ok(0.0);
        }
        pick(&export).ok_or_else(|| HealthError::QueryFailed {
            metric: metric.to_string(),
            message: "missing from export".into(),
        })
    }
}

fn query_failed(metric: &str, err: impl std::fmt::Display) -> HealthError {
    HealthError::QueryFailed {
        metric: metric.to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl HealthDataSource for JsonFileHealthSource {
    async fn request_authorization(&self) -> Result<(), HealthError> {
        if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            Ok(())
        } else {
            Err(HealthError::Unavailable)
        }
    }

    async fn step_count(&self) -> Result<f64, HealthError> {
        self.quantity("steps", |e| e.steps).await
    }

    async fn active_energy_burned(&self) -> Result<f64, HealthError> {
        self.quantity("active_energy", |e| e.active_energy_kcal).await
    }

    async fn exercise_minutes(&self) -> Result<f64, HealthError> {
        self.quantity("exercise", |e| e.exercise_minutes).await
    }

    async fn sleep_minutes(&self) -> Result<f64, HealthError> {
        self.quantity("sleep", |e| e.sleep_minutes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_source_fills_snapshot() {
        let source = StaticHealthSource::new(HealthSnapshot {
            steps: Some(8042.0),
            active_energy_kcal: Some(410.5),
            exercise_minutes: Some(25.0),
            sleep_minutes: None,
        });
        let snap = fetch_today(&source).await;
        assert_eq!(snap.steps, Some(8042.0));
        assert_eq!(snap.active_energy_kcal, Some(410.5));
        assert_eq!(snap.exercise_minutes, Some(25.0));
        assert_eq!(snap.sleep_minutes, None);
    }

    #[tokio::test]
    async fn denied_authorization_gives_empty_snapshot() {
        let snap = fetch_today(&StaticHealthSource::denied()).await;
        assert!(snap.is_empty());
    }

    #[tokio::test]
    async fn unavailable_source_gives_empty_snapshot() {
        let snap = fetch_today(&UnavailableHealthSource).await;
        assert!(snap.is_empty());
        assert!(matches!(
            UnavailableHealthSource.step_count().await,
            Err(HealthError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn json_export_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("health.json");
        let today = Local::now().date_naive();
        std::fs::write(
            &path,
            format!(r#"{{"date":"{today}","steps":1200,"exercise_minutes":12.5}}"#),
        )
        .unwrap();

        let snap = fetch_today(&JsonFileHealthSource::new(&path)).await;
        assert_eq!(snap.steps, Some(1200.0));
        assert_eq!(snap.exercise_minutes, Some(12.5));
        assert_eq!(snap.active_energy_kcal, None);
    }

    #[tokio::test]
    async fn stale_export_reads_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("health.json");
        std::fs::write(&path, r#"{"date":"2000-01-01","steps":99999}"#).unwrap();

        let snap = fetch_today(&JsonFileHealthSource::new(&path)).await;
        assert_eq!(snap.steps, Some(0.0));
    }

    #[tokio::test]
    async fn missing_export_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonFileHealthSource::new(dir.path().join("absent.json"));
        assert!(matches!(
            source.request_authorization().await,
            Err(HealthError::Unavailable)
        ));
        assert!(fetch_today(&source).await.is_empty());
    }
}
