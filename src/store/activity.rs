//! Recent-activity audit log
//!
//! A small durable log of the clinician's latest actions, shown on the
//! dashboard. The log is hard-capped: recording an entry prunes everything
//! beyond the newest `max_entries` in the same transaction, so the stored
//! list can never exceed the cap even across process restarts.

use crate::config::ACTIVITY_CAP;
use crate::error::{Result, TherakitError};
use anyhow::Context;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Category of a recent-activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Session,
    Assessment,
    Learner,
    Report,
    Login,
}

impl ActivityKind {
    /// Stable text form used in sqlite and CLI flags.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Session => "session",
            ActivityKind::Assessment => "assessment",
            ActivityKind::Learner => "learner",
            ActivityKind::Report => "report",
            ActivityKind::Login => "login",
        }
    }

    /// Parses the text form; `None` for anything unrecognized.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "session" => Some(ActivityKind::Session),
            "assessment" => Some(ActivityKind::Assessment),
            "learner" => Some(ActivityKind::Learner),
            "report" => Some(ActivityKind::Report),
            "login" => Some(ActivityKind::Login),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the recent-activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub id: String,
    pub message: String,
    pub kind: ActivityKind,
    pub created_at: DateTime<Utc>,
}

/// Durable recent-activity log backed by sqlite.
pub struct ActivityLog {
    db_path: PathBuf,
    max_entries: usize,
}

impl ActivityLog {
    /// Create a log at the default data directory
    ///
    /// The path can be overridden with the `THERAKIT_ACTIVITY_DB`
    /// environment variable, which makes it easy to point the binary at a
    /// test DB or alternate file without changing the user's application
    /// data dir. `max_entries` above the hard cap is reduced to it.
    pub fn new(max_entries: usize) -> Result<Self> {
        if let Ok(override_path) = std::env::var("THERAKIT_ACTIVITY_DB") {
            return Self::new_with_path(override_path, max_entries);
        }

        let proj_dirs = ProjectDirs::from("com", "therakit", "therakit")
            .ok_or_else(|| TherakitError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| TherakitError::Storage(e.to_string()))?;

        let db_path = data_dir.join("activity.db");
        Self::new_with_path(db_path, max_entries)
    }

    /// Create a log that uses the specified database path.
    ///
    /// This is primarily useful for tests where the default application
    /// data directory is not desirable (for example, a temporary
    /// directory).
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P, max_entries: usize) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists so opening the DB file succeeds.
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| TherakitError::Storage(e.to_string()))?;
        }

        let log = Self {
            db_path,
            max_entries: max_entries.min(ACTIVITY_CAP),
        };
        log.init()?;
        Ok(log)
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS recent_activity (
                id TEXT PRIMARY KEY,
                message TEXT NOT NULL,
                kind TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| TherakitError::Storage(e.to_string()))?;

        Ok(())
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| TherakitError::Storage(e.to_string()).into())
    }

    /// Records an entry and prunes the log to `max_entries` in the same
    /// transaction. Returns the persisted entry.
    pub fn record(&self, message: &str, kind: ActivityKind) -> Result<RecentActivity> {
        let activity = RecentActivity {
            id: uuid::Uuid::new_v4().to_string(),
            message: message.to_string(),
            kind,
            created_at: Utc::now(),
        };

        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| TherakitError::Storage(e.to_string()))?;

        tx.execute(
            "INSERT INTO recent_activity (id, message, kind, created_at)
            VALUES (?, ?, ?, ?)",
            params![
                activity.id,
                activity.message,
                activity.kind.as_str(),
                activity.created_at.to_rfc3339()
            ],
        )
        .context("Failed to insert activity")
        .map_err(|e| TherakitError::Storage(e.to_string()))?;

        // rowid order is insertion order, which breaks same-second ties.
        tx.execute(
            "DELETE FROM recent_activity WHERE rowid NOT IN (
                SELECT rowid FROM recent_activity ORDER BY rowid DESC LIMIT ?
            )",
            params![self.max_entries as i64],
        )
        .context("Failed to prune activity log")
        .map_err(|e| TherakitError::Storage(e.to_string()))?;

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| TherakitError::Storage(e.to_string()))?;

        Ok(activity)
    }

    /// Returns the retained entries, newest first.
    pub fn recent(&self) -> Result<Vec<RecentActivity>> {
        let conn = self.open()?;

        let mut stmt = conn
            .prepare(
                "SELECT id, message, kind, created_at FROM recent_activity
                ORDER BY rowid DESC LIMIT ?",
            )
            .context("Failed to prepare statement")
            .map_err(|e| TherakitError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![self.max_entries as i64], |row| {
                let id: String = row.get(0)?;
                let message: String = row.get(1)?;
                let kind_str: String = row.get(2)?;
                let created_at_str: String = row.get(3)?;

                // Fallbacks if parsing fails
                let kind = ActivityKind::parse(&kind_str).unwrap_or(ActivityKind::Session);
                let created_at = DateTime::parse_from_rfc3339(&created_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now());

                Ok(RecentActivity {
                    id,
                    message,
                    kind,
                    created_at,
                })
            })
            .context("Failed to query activities")
            .map_err(|e| TherakitError::Storage(e.to_string()))?;

        let mut activities = Vec::new();
        for row in rows {
            match row {
                Ok(activity) => activities.push(activity),
                Err(e) => warn!(error = %e, "Skipping undecodable activity row"),
            }
        }

        Ok(activities)
    }

    /// Number of stored entries.
    pub fn count(&self) -> Result<usize> {
        let conn = self.open()?;
        let count: i64 = conn
            .query_row("SELECT count(*) FROM recent_activity", [], |r| r.get(0))
            .context("Failed to count activities")
            .map_err(|e| TherakitError::Storage(e.to_string()))?;
        Ok(count as usize)
    }

    /// Removes every entry.
    pub fn clear(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute("DELETE FROM recent_activity", [])
            .context("Failed to clear activity log")
            .map_err(|e| TherakitError::Storage(e.to_string()))?;
        Ok(())
    }
}
