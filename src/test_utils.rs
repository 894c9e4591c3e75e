//! Test utilities for therakit
//!
//! This module provides common test utilities including temporary directory
//! management, test file creation, assertion helpers, and a data store
//! wired to the in-process fake API.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use crate::api::fake::FakeApi;
use crate::config::Config;
use crate::error::Result;
use crate::store::{ActivityLog, DataStore};

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Arguments
///
/// * `dir` - Directory to create the file in
/// * `name` - Name of the file
/// * `content` - Content to write to the file
///
/// # Returns
///
/// Returns the path to the created file
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// The full context chain is searched, not only the outermost message.
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected
/// message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration with default values
pub fn test_config() -> Config {
    Config::default()
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
api:
  base_url: http://localhost:8000
  timeout_seconds: 30

assistant:
  attach_session_notes: true
  notes_window_days: 30
  attach_ai_preferences: true

activity:
  max_entries: 10
"#
    .to_string()
}

/// Create a data store over the given fake API, with its activity log in
/// a fresh temporary directory
///
/// # Returns
///
/// Returns the store and the TempDir keeping its database alive
pub fn test_store(api: Arc<FakeApi>) -> (DataStore, TempDir) {
    let dir = temp_dir();
    let log =
        ActivityLog::new_with_path(dir.path().join("activity.db"), 10).expect("activity log");
    (DataStore::new(api, log), dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TherakitError;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(TherakitError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<()> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<()> = Err(TherakitError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config() {
        let config = test_config();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_config_yaml() {
        let yaml = test_config_yaml();
        assert!(yaml.contains("api:"));
        assert!(yaml.contains("assistant:"));
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_store_starts_empty() {
        let api = Arc::new(FakeApi::new());
        let (store, _dir) = test_store(api);
        assert!(store.learners().items.is_empty());
        assert!(store.recent_activity().unwrap().is_empty());
    }
}
