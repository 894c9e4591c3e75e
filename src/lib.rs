//! therakit - Pediatric therapy practice management client library
//!
//! This library provides the core functionality for the therakit client,
//! including the typed data store over the practice REST API, the activity
//! assistant conversation flow, enrollment handling, and configuration.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Practice API trait, wire types, and the HTTP client
//! - `store`: Cached collections, goals cache, activity log, store events
//! - `assistant`: Assistant session flow, transcript, and retry handling
//! - `enroll`: Enrollment intake forms and document uploads
//! - `auth`: Bearer token storage in the OS keyring
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use therakit::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("therakit.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     // Store and assistant usage would go here
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod assistant;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod enroll;
pub mod error;
pub mod metrics;
pub mod store;

// Re-export commonly used types
pub use api::PracticeApi;
pub use assistant::{AssistantFlow, SessionPhase};
pub use config::Config;
pub use error::{Result, TherakitError};
pub use store::DataStore;

#[cfg(test)]
pub mod test_utils;
