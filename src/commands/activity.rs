//! Recent-activity log commands
//!
//! The log is local and capped; these handlers never touch the network.

use prettytable::{row, Table};

use crate::error::{Result, TherakitError};
use crate::store::{ActivityKind, DataStore, RecentActivity};

/// List retained activity entries, newest first
pub fn list(store: &DataStore, json: bool) -> Result<()> {
    let entries = store.recent_activity()?;

    if entries.is_empty() {
        if json {
            println!("[]");
        } else {
            println!("No recent activity.");
        }
        return Ok(());
    }

    if json {
        output_entries_json(&entries)?;
    } else {
        output_entries_table(&entries);
    }

    Ok(())
}

/// Append an entry to the activity log
pub fn add(store: &DataStore, message: &str, kind: &str) -> Result<()> {
    let kind = parse_kind(kind)?;
    let entry = store.add_activity(message, kind)?;
    println!("Recorded: [{}] {}", entry.kind, entry.message);
    Ok(())
}

/// Remove every entry from the activity log
pub fn clear(store: &DataStore) -> Result<()> {
    store.clear_activity()?;
    println!("Activity log cleared.");
    Ok(())
}

fn parse_kind(kind: &str) -> Result<ActivityKind> {
    ActivityKind::parse(kind).ok_or_else(|| {
        TherakitError::Config(format!(
            "Unknown activity kind '{}' (expected session, assessment, learner, report, or login)",
            kind
        ))
        .into()
    })
}

/// Output activity entries in JSON format
///
/// # Errors
///
/// Returns `TherakitError::Serialization` if serialization fails
fn output_entries_json(entries: &[RecentActivity]) -> Result<()> {
    let json = crate::commands::serialize_pretty(entries).map_err(TherakitError::Serialization)?;
    println!("{}", json);
    Ok(())
}

/// Output activity entries in table format
fn output_entries_table(entries: &[RecentActivity]) {
    let mut table = Table::new();
    table.add_row(row!["When", "Kind", "Message"]);

    for entry in entries {
        table.add_row(row![
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.kind,
            entry.message
        ]);
    }

    println!("\nRecent activity:\n");
    table.printstd();
    println!();
}
