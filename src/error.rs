//! Error types for therakit
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Exact message surfaced when a request is attempted with no stored
/// bearer token. Collection error slots carry this string verbatim so
/// callers can present a "sign in" affordance instead of a generic retry.
pub const NO_ACCESS_TOKEN: &str = "No access token found";

/// Main error type for therakit operations
///
/// This enum encompasses all possible errors that can occur while talking
/// to the practice API, resolving credentials, driving the assistant
/// conversation flow, and persisting the local activity log.
#[derive(Error, Debug)]
pub enum TherakitError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication errors (missing or rejected bearer token)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The practice API returned a non-success HTTP status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the server
        status: u16,
        /// Error detail, preferring the JSON `detail` field over raw body text
        message: String,
    },

    /// Assistant flow invoked while a turn is already in flight
    #[error("Assistant session is busy ({phase}); wait for the current turn to finish")]
    AssistantBusy {
        /// Human-readable name of the phase that blocked the call
        phase: String,
    },

    /// Assistant flow errors other than busy (unknown retry target, etc.)
    #[error("Assistant error: {0}")]
    Assistant(String),

    /// Enrollment form validation errors
    #[error("Enrollment error: {0}")]
    Enrollment(String),

    /// Activity log storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl TherakitError {
    /// Shorthand for the missing-token authentication error.
    pub fn no_access_token() -> Self {
        TherakitError::Authentication(NO_ACCESS_TOKEN.to_string())
    }
}

/// Result type alias for therakit operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
