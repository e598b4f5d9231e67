use balance_core::{MetricKey, ValidationError};
use clap::Args;

use super::{open_store, CmdResult};

#[derive(Args)]
pub struct OnboardArgs {
    /// Metrics to track (e.g. "water,meditation")
    #[arg(long, value_delimiter = ',')]
    track: Vec<MetricKey>,
    /// Custom goal as NAME:TARGET, repeatable
    #[arg(long = "goal")]
    goals: Vec<String>,
    /// Checkable custom goal as NAME, repeatable
    #[arg(long = "check-goal")]
    check_goals: Vec<String>,
}

/// Split `NAME:TARGET` on its last colon.
fn parse_goal(arg: &str) -> Result<(&str, u32), String> {
    let (name, target) = arg
        .rsplit_once(':')
        .ok_or_else(|| format!("expected NAME:TARGET, got '{arg}'"))?;
    let target: u32 = target
        .trim()
        .parse()
        .map_err(|_| format!("invalid target in '{arg}'"))?;
    if target == 0 {
        return Err(format!("{} in '{arg}'", ValidationError::NonPositiveTarget));
    }
    Ok((check_name(name)?, target))
}

fn check_name(name: &str) -> Result<&str, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName.to_string());
    }
    Ok(name)
}

pub fn run(args: OnboardArgs) -> CmdResult {
    let mut store = open_store()?;
    if store.is_onboarding_completed() {
        println!("onboarding already completed");
        return Ok(());
    }

    // Parse everything first so a bad goal leaves onboarding untouched.
    let goals = args
        .goals
        .iter()
        .map(|g| parse_goal(g))
        .collect::<Result<Vec<_>, _>>()?;
    let check_goals = args
        .check_goals
        .iter()
        .map(|name| check_name(name))
        .collect::<Result<Vec<_>, _>>()?;

    for key in &args.track {
        store.set_tracked(*key, true)?;
    }
    for (name, target) in goals {
        store.add_custom_goal(name, target, false)?;
    }
    for name in check_goals {
        store.add_custom_goal(name, 1, true)?;
    }
    store.complete_onboarding()?;

    println!(
        "onboarding complete: {} metrics, {} custom goals",
        args.track.len(),
        store.custom_goals().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_spec_splits_on_last_colon() {
        assert_eq!(parse_goal("Read:60").unwrap(), ("Read", 60));
        assert_eq!(parse_goal("Study: Rust:30").unwrap(), ("Study: Rust", 30));
        assert!(parse_goal("Read").is_err());
        assert!(parse_goal("Read:lots").is_err());
        assert!(parse_goal("Bad:0").is_err());
        assert!(parse_goal("  :5").is_err());
        assert_eq!(parse_goal(" Read :5").unwrap(), ("Read", 5));
    }
}
