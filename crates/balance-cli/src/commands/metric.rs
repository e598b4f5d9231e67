use balance_core::goals::progress::{self, GoalAction};
use balance_core::{Config, MetricKey, TrackingMode, ValidationError};
use clap::Subcommand;
use serde::Serialize;

use super::{open_store, print_json, record_metric, CmdResult};

#[derive(Subcommand)]
pub enum MetricAction {
    /// List every metric with its target and today's value
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Tap a metric row: check it off or add one step
    Tap {
        /// Metric key (e.g. "water")
        metric: MetricKey,
    },
    /// Overwrite today's value
    Set {
        metric: MetricKey,
        value: u32,
    },
    /// Start tracking a metric
    Track { metric: MetricKey },
    /// Stop tracking a metric
    Untrack { metric: MetricKey },
}

#[derive(Serialize)]
struct MetricInfo {
    metric: MetricKey,
    category: String,
    label: &'static str,
    unit: &'static str,
    mode: TrackingMode,
    tracked: bool,
    value: u32,
    target: u32,
}

/// The action a tap maps to for this metric's tracking mode.
fn tap_action(key: MetricKey, step: u32) -> Result<GoalAction, ValidationError> {
    match key.mode() {
        TrackingMode::Check => Ok(GoalAction::Check),
        TrackingMode::Increment | TrackingMode::Timed => Ok(GoalAction::Increment(step)),
        TrackingMode::HealthSynced => Err(ValidationError::InvalidValue {
            field: key.to_string(),
            message: "synced from health data; use `metric set`".into(),
        }),
    }
}

pub fn run(action: MetricAction) -> CmdResult {
    let mut store = open_store()?;
    let config = Config::load_or_default();

    match action {
        MetricAction::List { json } => {
            let rows: Vec<MetricInfo> = MetricKey::all()
                .map(|key| MetricInfo {
                    metric: key,
                    category: key.category().to_string(),
                    label: key.label(),
                    unit: key.unit(),
                    mode: key.mode(),
                    tracked: store.is_tracked(key),
                    value: store.metric(key).unwrap_or(0),
                    target: config.target(key),
                })
                .collect();
            if json {
                return print_json(&rows);
            }
            for row in rows {
                let mark = if row.tracked { "*" } else { " " };
                println!(
                    "{mark} {:<18} {:<20} {}/{} {}",
                    row.metric, row.label, row.value, row.target, row.unit
                );
            }
        }
        MetricAction::Tap { metric } => {
            let target = config.target(metric);
            let current = store.metric(metric).unwrap_or(0);
            let action = tap_action(metric, config.progress.increment_step)?;
            let value = progress::apply(current, target, action);
            let streak = record_metric(&mut store, metric, value, target)?;
            print_progress(metric, value, target, streak.map(|s| s.current()));
        }
        MetricAction::Set { metric, value } => {
            let target = config.target(metric);
            let streak = record_metric(&mut store, metric, value, target)?;
            print_progress(metric, value, target, streak.map(|s| s.current()));
        }
        MetricAction::Track { metric } => {
            store.set_tracked(metric, true)?;
            println!("tracking {metric}");
        }
        MetricAction::Untrack { metric } => {
            store.set_tracked(metric, false)?;
            println!("stopped tracking {metric}");
        }
    }
    Ok(())
}

fn print_progress(metric: MetricKey, value: u32, target: u32, streak: Option<u32>) {
    let done = if progress::is_complete(value, target) {
        " (done)"
    } else {
        ""
    };
    println!(
        "{metric}: {value}/{target} {}{done}  streak {}",
        metric.unit(),
        streak.unwrap_or(0)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use balance_core::{FitnessMetric, MentalHealthMetric};

    #[test]
    fn tap_follows_tracking_mode() {
        assert_eq!(
            tap_action(FitnessMetric::Water.into(), 1).unwrap(),
            GoalAction::Check
        );
        assert_eq!(
            tap_action(MentalHealthMetric::Meditation.into(), 5).unwrap(),
            GoalAction::Increment(5)
        );
        assert!(tap_action(FitnessMetric::Steps.into(), 1).is_err());
    }
}
