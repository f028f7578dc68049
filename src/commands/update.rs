//! Update command handlers.

use crate::args::{UpdateActiveArgs, UpdateGoalArgs};
use crate::commands::Out;
use crate::error::{input, ErrorType, IntoResult};
use crate::{Config, Result};

fn state(active: bool) -> &'static str {
    if active {
        "active"
    } else {
        "inactive"
    }
}

/// Activates or deactivates an income source. Existing pay periods are kept.
pub async fn update_income_source(config: Config, args: UpdateActiveArgs) -> Result<Out<()>> {
    config
        .db()
        .set_income_source_active(args.id, args.active)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(format!("Income source {} is now {}", args.id, state(args.active)).into())
}

/// Activates or deactivates a deduction. Only net pay computed afterwards is affected.
pub async fn update_deduction(config: Config, args: UpdateActiveArgs) -> Result<Out<()>> {
    config
        .db()
        .set_deduction_active(args.id, args.active)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(format!("Deduction {} is now {}", args.id, state(args.active)).into())
}

/// Records the amount saved toward a goal and/or changes whether it is active.
///
/// # Errors
/// - `ErrorType::Input` if neither `current` nor `active` is given.
/// - `ErrorType::NotFound` if the goal does not exist.
pub async fn update_goal(config: Config, args: UpdateGoalArgs) -> Result<Out<()>> {
    if args.current.is_none() && args.active.is_none() {
        return Err(input("Nothing to update, pass --current and/or --active"))
            .pub_result(ErrorType::Input);
    }

    let mut changes = Vec::new();
    if let Some(current) = args.current {
        config
            .db()
            .set_goal_current(args.id, current)
            .await
            .pub_result(ErrorType::Database)?;
        changes.push(format!("saved {current}"));
    }
    if let Some(active) = args.active {
        config
            .db()
            .set_goal_active(args.id, active)
            .await
            .pub_result(ErrorType::Database)?;
        changes.push(state(active).to_string());
    }
    Ok(format!("Savings goal {} is now {}", args.id, changes.join(" and ")).into())
}
