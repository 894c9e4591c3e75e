//! Monthly session summaries
//!
//! Rolls the raw session list up into per-month counts for the sessions
//! dashboard. Sessions whose dates fail to parse are skipped rather than
//! failing the whole rollup.

use crate::api::{BackendSession, SessionStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Aggregated counts for one calendar month of sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    /// Month key in `YYYY-MM` form.
    pub month: String,
    /// Sessions dated in this month, regardless of status.
    pub total: u32,
    /// Sessions with completed status.
    pub completed: u32,
    /// Sum of planned activity counts across the month's sessions.
    pub planned_activities: u32,
    /// Sum of completed activity counts across the month's sessions.
    pub completed_activities: u32,
}

/// Groups sessions by calendar month, newest month first.
pub fn summarize_by_month(sessions: &[BackendSession]) -> Vec<MonthlySummary> {
    let mut by_month: BTreeMap<String, MonthlySummary> = BTreeMap::new();

    for session in sessions {
        let month = match NaiveDate::parse_from_str(&session.session_date, "%Y-%m-%d") {
            Ok(date) => date.format("%Y-%m").to_string(),
            Err(_) => {
                warn!(
                    session_id = %session.id,
                    date = %session.session_date,
                    "Skipping session with unparseable date"
                );
                continue;
            }
        };

        let entry = by_month.entry(month.clone()).or_insert(MonthlySummary {
            month,
            total: 0,
            completed: 0,
            planned_activities: 0,
            completed_activities: 0,
        });

        entry.total += 1;
        if session.status == SessionStatus::Completed {
            entry.completed += 1;
        }
        entry.planned_activities += session.planned_activities;
        entry.completed_activities += session.completed_activities;
    }

    // BTreeMap iterates months ascending; the dashboard wants newest first.
    by_month.into_values().rev().collect()
}
