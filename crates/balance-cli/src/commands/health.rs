use balance_core::{
    fetch_today, Config, HealthDataSource, HealthSnapshot, JsonFileHealthSource,
    UnavailableHealthSource,
};

use super::{print_json, CmdResult};

fn source(config: &Config) -> Box<dyn HealthDataSource> {
    match &config.health.export_path {
        Some(path) => Box::new(JsonFileHealthSource::new(path)),
        None => Box::new(UnavailableHealthSource),
    }
}

pub fn run(json: bool) -> CmdResult {
    let config = Config::load_or_default();
    if !config.health.enabled {
        println!("health data is disabled (health.enabled = false)");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let snapshot = runtime.block_on(async { fetch_today(source(&config).as_ref()).await });

    if json {
        return print_json(&snapshot);
    }
    print_snapshot(&snapshot);
    Ok(())
}

fn print_snapshot(snapshot: &HealthSnapshot) {
    let show = |label: &str, value: Option<f64>, unit: &str| match value {
        Some(v) => println!("{label:<10} {v:.0} {unit}"),
        None => println!("{label:<10} unavailable"),
    };
    show("Steps", snapshot.steps, "steps");
    show("Calories", snapshot.active_energy_kcal, "kcal");
    show("Workout", snapshot.exercise_minutes, "min");
    show("Sleep", snapshot.sleep_minutes, "min");
}
