use std::time::Duration;

use balance_core::{spawn_ticker, ActivityTimer, Config, MetricKey, TimerEvent, TrackingMode};
use clap::Subcommand;

use super::{open_store, record_metric, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Count a timed activity up in the foreground until its goal is reached
    Run {
        /// Timed metric (e.g. "meditation")
        metric: MetricKey,
        /// Stop after crediting this many periods even if the goal is not reached
        #[arg(long)]
        periods: Option<u32>,
    },
}

pub fn run(action: TimerAction) -> CmdResult {
    match action {
        TimerAction::Run { metric, periods } => {
            if metric.mode() != TrackingMode::Timed {
                return Err(format!("{metric} is not a timed activity").into());
            }
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_timer(metric, periods))
        }
    }
}

async fn run_timer(metric: MetricKey, periods: Option<u32>) -> CmdResult {
    let mut store = open_store()?;
    let config = Config::load_or_default();
    let target = config.target(metric);
    let period = Duration::from_secs(config.timer.tick_seconds);

    let mut timer = ActivityTimer::new(metric, store.metric(metric).unwrap_or(0), target, period);
    if timer.start().is_none() {
        println!("{metric}: goal already reached ({}/{target})", timer.value());
        return Ok(());
    }
    println!("{metric}: timer started at {}/{target} {}", timer.value(), metric.unit());

    let start_value = timer.value();
    let (ticker, mut ticks) = spawn_ticker(period);

    while timer.is_active() {
        if ticks.recv().await.is_none() {
            break;
        }
        tracing::debug!(%metric, value = timer.value(), "timer tick");
        for event in timer.tick() {
            match event {
                TimerEvent::Increment { value, .. } => {
                    record_metric(&mut store, metric, value, target)?;
                    println!("{metric}: {value}/{target} {}", metric.unit());
                }
                TimerEvent::GoalReached { value, .. } => {
                    println!("{metric}: goal reached ({value}/{target})");
                }
                _ => {}
            }
        }
        if timer.is_active() && periods.is_some_and(|max| credited(start_value, timer.value()) >= max) {
            if let Some(TimerEvent::Stopped { value, .. }) = timer.stop() {
                println!("{metric}: timer stopped at {value}/{target}");
            }
        }
    }

    ticker.cancel();
    Ok(())
}

/// Periods the timer has credited since it started.
fn credited(start_value: u32, value: u32) -> u32 {
    value.saturating_sub(start_value)
}
