//! Bearer token management commands
//!
//! The practice portal issues tokens out of band; these handlers store,
//! remove, and inspect the copy kept in the OS keyring. No network calls
//! are made here.

use chrono::{Duration, Utc};
use colored::Colorize;

use crate::auth::{AccessToken, TokenStore, TOKEN_ENV_VAR};
use crate::error::{Result, TherakitError};
use crate::store::{ActivityKind, DataStore};

const DEFAULT_PROFILE: &str = "default";

/// Store a bearer token in the system keyring
///
/// Prompts for the token when `--token` was not given. An expiry is
/// attached when `--expires-in` is present so staleness can be detected
/// locally.
///
/// # Arguments
///
/// * `store` - Data store, used to record the sign-in in the activity log
/// * `token` - Token value from the command line, if any
/// * `expires_in` - Token lifetime in seconds from now
/// * `label` - Friendly label shown by `auth status`
pub fn login(
    store: &DataStore,
    token: Option<String>,
    expires_in: Option<i64>,
    label: Option<String>,
) -> Result<()> {
    let token_value = match token {
        Some(value) => value,
        None => prompt_for_token()?,
    };
    let token_value = token_value.trim();

    if token_value.is_empty() {
        return Err(TherakitError::Authentication("No token provided".to_string()).into());
    }

    let access = build_token(token_value.to_string(), expires_in, label);
    TokenStore.save_token(DEFAULT_PROFILE, &access)?;
    tracing::info!("Stored bearer token for profile {}", DEFAULT_PROFILE);

    if let Err(e) = store.add_activity("Signed in to the practice API", ActivityKind::Login) {
        tracing::warn!("Could not record login activity: {}", e);
    }

    println!("{}", "Token stored in the system keyring.".green());
    println!("Expires: {}", expiry_line(&access));
    Ok(())
}

/// Remove the stored token
///
/// Safe to run when no token is stored.
pub fn logout(store: &DataStore) -> Result<()> {
    TokenStore.delete_token(DEFAULT_PROFILE)?;
    tracing::info!("Removed bearer token for profile {}", DEFAULT_PROFILE);

    if let Err(e) = store.add_activity("Signed out of the practice API", ActivityKind::Login) {
        tracing::warn!("Could not record logout activity: {}", e);
    }

    println!("Stored token removed.");
    Ok(())
}

/// Show whether a usable token is available
///
/// Reports the `THERAKIT_API_TOKEN` environment variable first, since it
/// takes precedence over the keyring at request time.
pub fn status() -> Result<()> {
    let env_token = std::env::var(TOKEN_ENV_VAR).unwrap_or_default();
    if !env_token.is_empty() {
        println!(
            "{}",
            format!("Using token from {} (keyring ignored).", TOKEN_ENV_VAR).green()
        );
        return Ok(());
    }

    match TokenStore.load_token(DEFAULT_PROFILE)? {
        None => {
            println!("Not signed in. Run 'therakit auth login' to store a token.");
        }
        Some(token) if token.is_expired() => {
            println!("{}", expiry_warning(&token).yellow());
        }
        Some(token) => {
            println!("{}", "Signed in.".green());
            if let Some(label) = &token.label {
                println!("Label:   {}", label);
            }
            println!("Expires: {}", expiry_line(&token));
        }
    }

    Ok(())
}

fn prompt_for_token() -> Result<String> {
    let mut rl = rustyline::DefaultEditor::new()?;
    let line = rl.readline("Paste the practice API token: ")?;
    Ok(line)
}

fn build_token(token: String, expires_in: Option<i64>, label: Option<String>) -> AccessToken {
    AccessToken {
        token,
        expires_at: expires_in.map(|seconds| Utc::now() + Duration::seconds(seconds)),
        label,
    }
}

fn expiry_line(token: &AccessToken) -> String {
    match token.expires_at {
        Some(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "never".to_string(),
    }
}

fn expiry_warning(token: &AccessToken) -> String {
    match token.expires_at {
        Some(at) => format!(
            "Stored token expired at {}. Run 'therakit auth login' again.",
            at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => "Stored token is expired. Run 'therakit auth login' again.".to_string(),
    }
}
