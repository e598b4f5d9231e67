use balance_core::goals::progress;
use balance_core::{Config, CustomGoal, GoalStore, SqliteStore};
use clap::Subcommand;
use uuid::Uuid;

use super::{open_store, print_json, CmdResult};

#[derive(Subcommand)]
pub enum CustomGoalAction {
    /// Add a custom goal
    Add {
        /// Goal name
        name: String,
        /// Daily target
        #[arg(long, default_value = "1")]
        target: u32,
        /// Complete with a single check instead of counting up
        #[arg(long)]
        checkable: bool,
    },
    /// List custom goals
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Tap a goal: check it off or add one step
    Tap { id: Uuid },
    /// Overwrite a goal's progress
    Progress { id: Uuid, value: u32 },
    /// Delete a goal
    Delete { id: Uuid },
}

pub fn run(action: CustomGoalAction) -> CmdResult {
    let mut store = open_store()?;

    match action {
        CustomGoalAction::Add {
            name,
            target,
            checkable,
        } => match store.add_custom_goal(&name, target, checkable)? {
            Some(goal) => {
                println!("Goal added: {}", goal.id);
                println!("Name: {}", goal.name);
            }
            None => return Err("custom goals are not loaded".into()),
        },
        CustomGoalAction::List { json } => {
            let goals = store.custom_goals();
            if json {
                return print_json(goals);
            }
            for goal in goals {
                print_goal(goal);
            }
        }
        CustomGoalAction::Tap { id } => {
            let goal = store
                .custom_goal(id)
                .ok_or_else(|| format!("goal not found: {id}"))?;
            let step = Config::load_or_default().progress.increment_step;
            let action = progress::default_action(goal.is_checkable, step);
            let value = progress::apply(goal.progress, goal.target, action);
            set_progress(&mut store, id, value)?;
        }
        CustomGoalAction::Progress { id, value } => {
            set_progress(&mut store, id, value)?;
        }
        CustomGoalAction::Delete { id } => {
            if store.delete_custom_goal(id)? {
                println!("Goal deleted: {id}");
            } else {
                return Err(format!("goal not found: {id}").into());
            }
        }
    }
    Ok(())
}

fn set_progress(
    store: &mut GoalStore<SqliteStore>,
    id: Uuid,
    value: u32,
) -> CmdResult {
    let goal = store
        .set_custom_goal_progress(id, value)?
        .ok_or_else(|| format!("goal not found: {id}"))?;
    print_goal(&goal);
    Ok(())
}

fn print_goal(goal: &CustomGoal) {
    let mark = if goal.is_completed() { "x" } else { " " };
    println!(
        "[{mark}] {}  {}/{}  {}",
        goal.name, goal.progress, goal.target, goal.id
    );
}
