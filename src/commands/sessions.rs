//! Session listing and monthly summary command
//!
//! `--today` switches to the day view; `--summary` aggregates the full
//! session list into per-month counts, newest month first.

use prettytable::{row, Table};

use crate::api::{BackendSession, SessionStatus};
use crate::error::{Result, TherakitError};
use crate::store::{summarize_by_month, DataStore, MonthlySummary};

/// List therapy sessions
///
/// # Arguments
///
/// * `store` - Data store backing the fetch
/// * `today` - Only sessions scheduled for the current day
/// * `summary` - Aggregate all sessions by month instead of listing them
/// * `json` - Print raw JSON instead of a table
pub async fn list_sessions(
    store: &DataStore,
    today: bool,
    summary: bool,
    json: bool,
) -> Result<()> {
    if summary {
        let sessions = store.fetch_sessions().await?;
        let months = summarize_by_month(&sessions);

        if months.is_empty() {
            if json {
                println!("[]");
            } else {
                println!("No sessions with usable dates.");
            }
            return Ok(());
        }

        if json {
            output_summary_json(&months)?;
        } else {
            output_summary_table(&months);
        }
        return Ok(());
    }

    let (scope, sessions) = if today {
        ("today", store.fetch_todays_sessions().await?)
    } else {
        ("all", store.fetch_sessions().await?)
    };

    if sessions.is_empty() {
        if json {
            println!("[]");
        } else {
            println!("No sessions found ({}).", scope);
        }
        return Ok(());
    }

    if json {
        output_sessions_json(&sessions)?;
    } else {
        output_sessions_table(&sessions, scope);
    }

    Ok(())
}

/// Output sessions in JSON format
///
/// # Errors
///
/// Returns `TherakitError::Serialization` if serialization fails
fn output_sessions_json(sessions: &[BackendSession]) -> Result<()> {
    let json =
        crate::commands::serialize_pretty(sessions).map_err(TherakitError::Serialization)?;
    println!("{}", json);
    Ok(())
}

/// Output monthly summaries in JSON format
fn output_summary_json(months: &[MonthlySummary]) -> Result<()> {
    let json = crate::commands::serialize_pretty(months).map_err(TherakitError::Serialization)?;
    println!("{}", json);
    Ok(())
}

/// Output sessions in table format
fn output_sessions_table(sessions: &[BackendSession], scope: &str) {
    let mut table = Table::new();
    table.add_row(row!["Id", "Learner", "Date", "Time", "Status", "Activities"]);

    for session in sessions {
        table.add_row(row![
            session.id,
            session.child_id,
            session.session_date,
            time_cell(&session.start_time, &session.end_time),
            status_label(session.status),
            activities_cell(session)
        ]);
    }

    println!("\nSessions ({}):\n", scope);
    table.printstd();
    println!();
}

/// Output monthly summaries in table format
fn output_summary_table(months: &[MonthlySummary]) {
    let mut table = Table::new();
    table.add_row(row![
        "Month",
        "Sessions",
        "Completed",
        "Planned Activities",
        "Completed Activities"
    ]);

    for month in months {
        table.add_row(row![
            month.month,
            month.total,
            month.completed,
            month.planned_activities,
            month.completed_activities
        ]);
    }

    println!("\nSessions by month:\n");
    table.printstd();
    println!();
}

/// Human-readable session status
fn status_label(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Planned => "planned",
        SessionStatus::InProgress => "in progress",
        SessionStatus::Completed => "completed",
        SessionStatus::Cancelled => "cancelled",
        SessionStatus::Unknown => "unknown",
    }
}

/// Time column from the optional start and end times
fn time_cell(start: &Option<String>, end: &Option<String>) -> String {
    match (start.as_deref(), end.as_deref()) {
        (Some(start), Some(end)) => format!("{}-{}", start, end),
        (Some(start), None) => start.to_string(),
        (None, _) => "-".to_string(),
    }
}

/// Activities column as completed over planned
fn activities_cell(session: &BackendSession) -> String {
    format!(
        "{}/{}",
        session.completed_activities, session.planned_activities
    )
}
