//! Configuration management for therakit
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, TherakitError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hard upper bound on the recent-activity audit log. Configurations may
/// lower it but never raise it.
pub const ACTIVITY_CAP: usize = 10;

/// Main configuration structure for therakit
///
/// This structure holds all configuration needed by the client,
/// including API endpoint settings, assistant behavior, and the
/// recent-activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Practice API endpoint configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Assistant conversation settings
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Recent-activity log settings
    #[serde(default)]
    pub activity: ActivityConfig,
}

/// Practice API endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the practice management API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for individual API requests (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Assistant conversation configuration
///
/// Controls which context the client attaches to each assistant turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Attach recent session notes to each message
    #[serde(default = "default_attach_notes")]
    pub attach_session_notes: bool,

    /// How far back to fetch session notes for context (days)
    #[serde(default = "default_notes_window")]
    pub notes_window_days: u32,

    /// Attach the learner's saved AI preferences to each message
    #[serde(default = "default_attach_prefs")]
    pub attach_ai_preferences: bool,
}

fn default_attach_notes() -> bool {
    true
}

fn default_notes_window() -> u32 {
    30
}

fn default_attach_prefs() -> bool {
    true
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            attach_session_notes: default_attach_notes(),
            notes_window_days: default_notes_window(),
            attach_ai_preferences: default_attach_prefs(),
        }
    }
}

/// Recent-activity log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Maximum retained entries (clamped to [`ACTIVITY_CAP`])
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_max_entries() -> usize {
    ACTIVITY_CAP
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);
        config.clamp_limits();

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TherakitError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| TherakitError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("THERAKIT_API_BASE") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("THERAKIT_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid THERAKIT_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(window) = std::env::var("THERAKIT_NOTES_WINDOW_DAYS") {
            if let Ok(value) = window.parse() {
                self.assistant.notes_window_days = value;
            } else {
                tracing::warn!("Invalid THERAKIT_NOTES_WINDOW_DAYS: {}", window);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(ref api_base) = cli.api_base {
            self.api.base_url = api_base.clone();
        }

        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// The activity cap is an audit-trail invariant; configurations may
    /// lower it but a larger value is silently reduced.
    fn clamp_limits(&mut self) {
        if self.activity.max_entries > ACTIVITY_CAP {
            tracing::warn!(
                "activity.max_entries {} exceeds cap, clamping to {}",
                self.activity.max_entries,
                ACTIVITY_CAP
            );
            self.activity.max_entries = ACTIVITY_CAP;
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Returns
    ///
    /// Returns Ok if configuration is valid
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(TherakitError::Config("api.base_url cannot be empty".to_string()).into());
        }

        let parsed = url::Url::parse(&self.api.base_url).map_err(|e| {
            TherakitError::Config(format!("Invalid api.base_url: {}: {}", self.api.base_url, e))
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(TherakitError::Config(format!(
                "api.base_url must use http or https, got: {}",
                parsed.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(TherakitError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.assistant.notes_window_days == 0 {
            return Err(TherakitError::Config(
                "assistant.notes_window_days must be greater than 0".to_string(),
            )
            .into());
        }

        if self.activity.max_entries == 0 {
            return Err(TherakitError::Config(
                "activity.max_entries must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            assistant: AssistantConfig::default(),
            activity: ActivityConfig::default(),
        }
    }
}
