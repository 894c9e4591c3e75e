//! Learner listing command
//!
//! Fetches one of the three learner collections through the data store so
//! the cached slot is populated as a side effect, then renders a table or
//! raw JSON.

use prettytable::{row, Table};

use crate::api::{Learner, LearnerStatus};
use crate::error::{Result, TherakitError};
use crate::store::DataStore;

/// List learners from the practice
///
/// # Arguments
///
/// * `store` - Data store backing the fetch
/// * `mine` - Restrict to learners assigned to the signed-in therapist
/// * `temp` - Restrict to learners still mid-enrollment
/// * `json` - Print raw JSON instead of a table
pub async fn list_learners(store: &DataStore, mine: bool, temp: bool, json: bool) -> Result<()> {
    let (scope, learners) = if mine {
        ("assigned to you", store.fetch_my_students().await?)
    } else if temp {
        ("awaiting enrollment", store.fetch_temp_students().await?)
    } else {
        ("all", store.fetch_learners().await?)
    };

    tracing::info!("Fetched {} learners ({})", learners.len(), scope);

    if learners.is_empty() {
        if json {
            println!("[]");
        } else {
            println!("No learners found ({}).", scope);
        }
        return Ok(());
    }

    if json {
        output_learners_json(&learners)?;
    } else {
        output_learners_table(&learners, scope);
    }

    Ok(())
}

/// Output learners in JSON format
///
/// # Errors
///
/// Returns `TherakitError::Serialization` if serialization fails
fn output_learners_json(learners: &[Learner]) -> Result<()> {
    let json =
        crate::commands::serialize_pretty(learners).map_err(TherakitError::Serialization)?;
    println!("{}", json);
    Ok(())
}

/// Output learners in table format
fn output_learners_table(learners: &[Learner], scope: &str) {
    let mut table = Table::new();
    table.add_row(row!["Id", "Name", "Age", "Status", "Goals", "Next Session"]);

    for learner in learners {
        table.add_row(row![
            learner.id,
            learner.name,
            learner.age,
            status_label(learner.status),
            goals_cell(&learner.goals),
            learner.next_session.as_deref().unwrap_or("-")
        ]);
    }

    println!("\nLearners ({}):\n", scope);
    table.printstd();
    println!();
}

/// Human-readable enrollment status
fn status_label(status: LearnerStatus) -> &'static str {
    match status {
        LearnerStatus::Active => "active",
        LearnerStatus::New => "new",
        LearnerStatus::AssessmentDue => "assessment due",
        LearnerStatus::Inactive => "inactive",
    }
}

/// Goals column: up to three names, then a count of the rest
fn goals_cell(goals: &[String]) -> String {
    if goals.is_empty() {
        return "-".to_string();
    }
    let shown = goals.iter().take(3).cloned().collect::<Vec<_>>().join(", ");
    if goals.len() > 3 {
        format!("{}, +{} more", shown, goals.len() - 3)
    } else {
        shown
    }
}
