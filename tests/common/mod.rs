//! Shared helpers for integration tests

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use therakit::api::{HttpApi, PracticeApi};
use therakit::auth::StaticTokenSource;
use therakit::config::ApiConfig;
use therakit::store::{ActivityLog, DataStore};

/// Bearer token every test client sends.
#[allow(dead_code)]
pub const TEST_TOKEN: &str = "test_token";

/// HTTP client pointed at `base_url`, authenticated with [`TEST_TOKEN`].
#[allow(dead_code)]
pub fn http_api(base_url: &str) -> Arc<dyn PracticeApi> {
    http_api_with_timeout(base_url, 5)
}

/// Same as [`http_api`] with an explicit request timeout.
#[allow(dead_code)]
pub fn http_api_with_timeout(base_url: &str, timeout_seconds: u64) -> Arc<dyn PracticeApi> {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds,
    };
    let tokens = Arc::new(StaticTokenSource::new(TEST_TOKEN));
    Arc::new(HttpApi::new(&config, tokens).expect("Failed to create HTTP client"))
}

/// Data store wired to `base_url` with a throwaway activity database.
///
/// The returned `TempDir` owns the database file; keep it alive for the
/// duration of the test.
#[allow(dead_code)]
pub fn wired_store(base_url: &str) -> (Arc<dyn PracticeApi>, Arc<DataStore>, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let activity = ActivityLog::new_with_path(dir.path().join("activity.db"), 10)
        .expect("Failed to open activity log");
    let api = http_api(base_url);
    let store = Arc::new(DataStore::new(api.clone(), activity));
    (api, store, dir)
}

/// Minimal learner record as the backend serves it.
#[allow(dead_code)]
pub fn learner_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "age": 6,
        "status": "active",
        "goals": []
    })
}

/// Minimal backend session record.
#[allow(dead_code)]
pub fn session_json(id: &str, child_id: &str, date: &str) -> Value {
    json!({
        "id": id,
        "child_id": child_id,
        "session_date": date,
        "start_time": "09:00",
        "end_time": "09:45",
        "status": "planned"
    })
}

/// Minimal goal record.
#[allow(dead_code)]
pub fn goal_json(id: &str, name: &str, status: &str) -> Value {
    json!({
        "id": id,
        "activity_name": name,
        "current_status": status
    })
}

/// Creates a temporary config file with the given contents.
#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("therakit.yaml");
    fs::write(&path, contents).expect("Failed to write config file");
    (dir, path)
}
