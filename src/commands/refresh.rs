//! Full-store refresh command
//!
//! Fans out a refresh of every collection through the data store, then
//! reports the per-collection state so partial failures are visible at a
//! glance.

use colored::Colorize;
use prettytable::{row, Table};

use crate::error::Result;
use crate::store::{CollectionState, DataStore};

/// Refresh every collection and report per-collection state
///
/// A failed collection keeps its previous items; its error is shown in
/// the report instead of aborting the other fetches.
pub async fn run_refresh(store: &DataStore) -> Result<()> {
    println!("Refreshing all collections...");
    let failures = store.refresh_all().await;

    let mut table = Table::new();
    table.add_row(row!["Collection", "Items", "State"]);
    add_report_row(&mut table, "learners", &store.learners());
    add_report_row(&mut table, "my learners", &store.my_students());
    add_report_row(&mut table, "pending enrollments", &store.temp_students());
    add_report_row(&mut table, "sessions", &store.sessions());
    add_report_row(&mut table, "today's sessions", &store.todays_sessions());

    println!();
    table.printstd();
    println!();

    if failures == 0 {
        println!("{}", "All collections refreshed.".green());
    } else {
        println!(
            "{}",
            format!("{} of 5 collections failed to refresh.", failures).yellow()
        );
    }

    Ok(())
}

fn add_report_row<T>(table: &mut Table, name: &str, state: &CollectionState<T>) {
    table.add_row(row![name, state.items.len(), state_label(state)]);
}

fn state_label<T>(state: &CollectionState<T>) -> String {
    match &state.error {
        Some(error) => format!("error: {}", error),
        None => "ok".to_string(),
    }
}
