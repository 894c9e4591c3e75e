/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

Each handler is a thin layer over the library components: it parses
nothing itself (the `cli` module already did), drives the data store,
assistant flow, or API client, and renders the result as a table or
JSON.
*/

// Bearer token management
pub mod auth;

// Learner listings
pub mod learners;

// Per-learner goal display
pub mod goals;

// Assistant preference display and updates
pub mod prefs;

// Session listings and monthly summaries
pub mod sessions;

// Full-store refresh with per-collection report
pub mod refresh;

// Interactive assistant chat
pub mod chat;

// Enrollment form submission
pub mod enroll;

// Supporting document management
pub mod docs;

// Recent-activity log inspection
pub mod activity;

/// Serialize a serializable value into pretty JSON string.
///
/// Returns the JSON string or the serde_json error.
pub(crate) fn serialize_pretty<T: serde::Serialize + ?Sized>(
    value: &T,
) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}
