//! Per-learner goal display command
//!
//! Reads through the store's goals cache; `--force` bypasses a previously
//! settled entry and refetches from the backend.

use prettytable::{row, Table};

use crate::api::{ChildGoal, GoalProgress};
use crate::error::{Result, TherakitError};
use crate::store::DataStore;

/// Show the goals tracked for one learner
///
/// # Arguments
///
/// * `store` - Data store backing the cached fetch
/// * `learner_id` - Learner whose goals to show
/// * `force` - Refetch even when a cached entry exists
/// * `json` - Print raw JSON instead of a table
pub async fn show_goals(
    store: &DataStore,
    learner_id: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    let goals = store.goals_for_learner(learner_id, force).await?;

    if goals.is_empty() {
        if json {
            println!("[]");
        } else {
            println!("No goals recorded for learner {}.", learner_id);
        }
        return Ok(());
    }

    if json {
        output_goals_json(&goals)?;
    } else {
        output_goals_table(&goals, learner_id);
    }

    Ok(())
}

/// Output goals in JSON format
///
/// # Errors
///
/// Returns `TherakitError::Serialization` if serialization fails
fn output_goals_json(goals: &[ChildGoal]) -> Result<()> {
    let json = crate::commands::serialize_pretty(goals).map_err(TherakitError::Serialization)?;
    println!("{}", json);
    Ok(())
}

/// Output goals in table format, with a progress tally underneath
fn output_goals_table(goals: &[ChildGoal], learner_id: &str) {
    let mut table = Table::new();
    table.add_row(row![
        "Goal",
        "Domain",
        "Status",
        "Attempts",
        "Last Attempted"
    ]);

    for goal in goals {
        table.add_row(row![
            goal.activity_name,
            goal.domain.as_deref().unwrap_or("-"),
            status_cell(goal),
            attempts_cell(goal),
            goal.last_attempted.as_deref().unwrap_or("-")
        ]);
    }

    println!("\nGoals for learner {}:\n", learner_id);
    table.printstd();
    println!(
        "\n{} goals, {} mastered\n",
        goals.len(),
        mastered_count(goals)
    );
}

fn status_cell(goal: &ChildGoal) -> &str {
    if goal.current_status.is_empty() {
        "not started"
    } else {
        &goal.current_status
    }
}

fn attempts_cell(goal: &ChildGoal) -> String {
    format!("{}/{}", goal.successful_attempts, goal.total_attempts)
}

fn mastered_count(goals: &[ChildGoal]) -> usize {
    goals
        .iter()
        .filter(|goal| goal.progress() == GoalProgress::Mastered)
        .count()
}
