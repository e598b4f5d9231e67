use balance_core::goals::progress;
use balance_core::{Category, Config, MetricKey, Streak};
use serde::Serialize;

use super::{open_store, percent, print_json, CmdResult};

#[derive(Serialize)]
struct MetricRow {
    metric: MetricKey,
    label: &'static str,
    unit: &'static str,
    value: u32,
    target: u32,
    completed: bool,
    streak: Option<Streak>,
}

#[derive(Serialize)]
struct GoalRow {
    id: String,
    name: String,
    progress: u32,
    target: u32,
    completed: bool,
}

#[derive(Serialize)]
struct Status {
    onboarding_completed: bool,
    fitness_progress: f64,
    mental_health_progress: f64,
    custom_progress: f64,
    metrics: Vec<MetricRow>,
    custom_goals: Vec<GoalRow>,
}

pub fn run(json: bool) -> CmdResult {
    let store = open_store()?;
    let config = Config::load_or_default();

    let metrics: Vec<MetricRow> = MetricKey::all()
        .filter(|key| store.is_tracked(*key))
        .map(|key| {
            let value = store.metric(key).unwrap_or(0);
            let target = config.target(key);
            MetricRow {
                metric: key,
                label: key.label(),
                unit: key.unit(),
                value,
                target,
                completed: progress::is_complete(value, target),
                streak: store.fetch_streak(key),
            }
        })
        .collect();

    let custom_goals: Vec<GoalRow> = store
        .custom_goals()
        .iter()
        .map(|g| GoalRow {
            id: g.id.to_string(),
            name: g.name.clone(),
            progress: g.progress,
            target: g.target,
            completed: g.is_completed(),
        })
        .collect();

    let status = Status {
        onboarding_completed: store.is_onboarding_completed(),
        fitness_progress: store
            .fitness()
            .map(|r| progress::category_overview(r, |m| config.target(m.into())))
            .unwrap_or(0.0),
        mental_health_progress: store
            .mental_health()
            .map(|r| progress::category_overview(r, |m| config.target(m.into())))
            .unwrap_or(0.0),
        custom_progress: progress::custom_overview(store.custom_goals()),
        metrics,
        custom_goals,
    };

    if json {
        return print_json(&status);
    }

    if !status.onboarding_completed {
        println!("onboarding not completed; run `balance onboard`");
    }
    println!(
        "{}: {}%  {}: {}%  {}: {}%",
        Category::Fitness,
        percent(status.fitness_progress),
        Category::MentalHealth,
        percent(status.mental_health_progress),
        Category::Custom,
        percent(status.custom_progress),
    );
    for row in &status.metrics {
        let mark = if row.completed { "x" } else { " " };
        let streak = row.streak.map(|s| s.current()).unwrap_or(0);
        println!(
            "[{mark}] {:<20} {}/{} {}  streak {streak}",
            row.label, row.value, row.target, row.unit
        );
    }
    for goal in &status.custom_goals {
        let mark = if goal.completed { "x" } else { " " };
        println!("[{mark}] {:<20} {}/{}  {}", goal.name, goal.progress, goal.target, goal.id);
    }
    Ok(())
}
