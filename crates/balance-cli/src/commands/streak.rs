use balance_core::{MetricKey, Streak};
use clap::Subcommand;
use serde::Serialize;

use super::{open_store, print_json, CmdResult};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Show one metric's streak
    Show {
        metric: MetricKey,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record one completion event
    Record {
        metric: MetricKey,
        /// The goal was missed
        #[arg(long)]
        missed: bool,
    },
    /// List every metric that has a streak
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct StreakRow {
    metric: MetricKey,
    current: u32,
    longest: u32,
}

impl StreakRow {
    fn new(metric: MetricKey, streak: Streak) -> Self {
        Self {
            metric,
            current: streak.current(),
            longest: streak.longest(),
        }
    }
}

pub fn run(action: StreakAction) -> CmdResult {
    let mut store = open_store()?;
    match action {
        StreakAction::Show { metric, json } => {
            let row = store.fetch_streak(metric).map(|s| StreakRow::new(metric, s));
            if json {
                return print_json(&row);
            }
            match row {
                Some(row) => println!("{metric}: current {}, longest {}", row.current, row.longest),
                None => println!("{metric}: no streak yet"),
            }
        }
        StreakAction::Record { metric, missed } => {
            if let Some(streak) = store.update_streak(metric, !missed)? {
                println!(
                    "{metric}: current {}, longest {}",
                    streak.current(),
                    streak.longest()
                );
            }
        }
        StreakAction::List { json } => {
            let rows: Vec<StreakRow> = MetricKey::all()
                .filter_map(|key| store.fetch_streak(key).map(|s| StreakRow::new(key, s)))
                .collect();
            if json {
                return print_json(&rows);
            }
            for row in rows {
                println!("{:<18} current {:>3}  longest {:>3}", row.metric, row.current, row.longest);
            }
        }
    }
    Ok(())
}
