//! Bearer-token persistence via OS keyring
//!
//! This module provides secure storage and retrieval of the practice API
//! bearer token using the operating system's native credential store
//! (Keychain on macOS, Secret Service on Linux, Windows Credential Manager
//! on Windows).
//!
//! Tokens are serialized to JSON before storage and deserialized on load.
//! The keyring is stateless; [`TokenStore`] is a zero-field struct that acts
//! as a namespaced accessor. Request-time resolution goes through the
//! [`TokenSource`] trait so the HTTP client can be driven by the keyring,
//! an environment variable, or a fixed string in tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TherakitError};

/// Environment variable consulted before the keyring. Set in CI and
/// scripted contexts where no credential store is available.
pub const TOKEN_ENV_VAR: &str = "THERAKIT_API_TOKEN";

// ---------------------------------------------------------------------------
// AccessToken
// ---------------------------------------------------------------------------

/// A stored practice API bearer token.
///
/// The token is issued out of band (pasted from the practice portal); this
/// client stores it verbatim together with an optional expiry so staleness
/// can be determined without a server round-trip.
///
/// # Examples
///
/// ```
/// use therakit::auth::AccessToken;
///
/// let token = AccessToken {
///     token: "my_api_token".to_string(),
///     expires_at: None,
///     label: None,
/// };
///
/// // A token with no expiry is never considered expired.
/// assert!(!token.is_expired());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// The bearer token string issued by the practice portal.
    pub token: String,

    /// UTC timestamp at which the token expires.
    ///
    /// When `None`, the token is treated as non-expiring. The value is
    /// stored as seconds-since-epoch via the `chrono` serde helpers so that
    /// it survives a round-trip through the keyring JSON representation.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_seconds_option"
    )]
    pub expires_at: Option<DateTime<Utc>>,

    /// Free-form label shown by `auth status` (e.g. the clinician's login).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl AccessToken {
    /// Returns `true` when the token is expired or about to expire.
    ///
    /// A 60-second buffer is applied so that callers see the token as
    /// unusable shortly before the server would reject it. Tokens with no
    /// `expires_at` value are considered perpetually valid.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(60);
                Utc::now() >= expires_at - buffer
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TokenStore
// ---------------------------------------------------------------------------

/// Stateless accessor for the OS native keyring.
///
/// Each profile's token is stored under a unique service name derived from
/// the profile identifier, so multiple practice accounts can coexist on the
/// same machine.
///
/// # Examples
///
/// ```no_run
/// use therakit::auth::{AccessToken, TokenStore};
///
/// # fn example() -> therakit::error::Result<()> {
/// let store = TokenStore;
/// let token = AccessToken {
///     token: "my_token".to_string(),
///     expires_at: None,
///     label: None,
/// };
/// store.save_token("default", &token)?;
/// let loaded = store.load_token("default")?;
/// assert!(loaded.is_some());
/// # Ok(())
/// # }
/// ```
pub struct TokenStore;

impl TokenStore {
    /// Builds the keyring service name for the given profile.
    ///
    /// The name is prefixed with `therakit-api-` to avoid collisions with
    /// other applications that use the same keyring.
    fn service_name(profile: &str) -> String {
        format!("therakit-api-{}", profile)
    }

    /// Persists an [`AccessToken`] for the named profile.
    ///
    /// The token is serialized to JSON and stored in the OS keyring under
    /// the service name derived from `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`TherakitError::Serialization`] if JSON serialization fails
    /// or [`TherakitError::Keyring`] if the OS credential store rejects the
    /// write.
    pub fn save_token(&self, profile: &str, token: &AccessToken) -> Result<()> {
        let json_str = serde_json::to_string(token)?;
        let service = Self::service_name(profile);
        let entry = keyring::Entry::new(&service, profile).map_err(TherakitError::Keyring)?;
        entry
            .set_password(&json_str)
            .map_err(TherakitError::Keyring)?;
        Ok(())
    }

    /// Loads the stored [`AccessToken`] for the named profile.
    ///
    /// Returns `Ok(None)` when no token has been saved for the profile,
    /// allowing callers to distinguish between "not signed in yet" and a
    /// genuine keyring error.
    ///
    /// # Errors
    ///
    /// Returns [`TherakitError::Keyring`] if the OS credential store returns
    /// an unexpected error, or [`TherakitError::Serialization`] if the
    /// stored JSON is malformed.
    pub fn load_token(&self, profile: &str) -> Result<Option<AccessToken>> {
        let service = Self::service_name(profile);
        let entry = keyring::Entry::new(&service, profile).map_err(TherakitError::Keyring)?;

        match entry.get_password() {
            Ok(json_str) => {
                let token: AccessToken = serde_json::from_str(&json_str)?;
                Ok(Some(token))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(TherakitError::Keyring(e).into()),
        }
    }

    /// Deletes the stored token for the named profile.
    ///
    /// This is a no-op when no token exists for the profile, so it is safe
    /// to call even when the caller is not sure whether a token was
    /// previously saved.
    ///
    /// # Errors
    ///
    /// Returns [`TherakitError::Keyring`] if the OS credential store returns
    /// an unexpected error.
    pub fn delete_token(&self, profile: &str) -> Result<()> {
        let service = Self::service_name(profile);
        let entry = keyring::Entry::new(&service, profile).map_err(TherakitError::Keyring)?;

        match entry.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(TherakitError::Keyring(e).into()),
        }
    }
}

// ---------------------------------------------------------------------------
// TokenSource
// ---------------------------------------------------------------------------

/// Request-time bearer token resolution.
///
/// The HTTP client resolves the token through this trait immediately before
/// each request. `Ok(None)` means "no credential available"; the client
/// turns that into an authentication error without touching the network.
pub trait TokenSource: Send + Sync {
    /// Returns the bearer token to attach, or `None` when no usable token
    /// is available.
    fn bearer_token(&self) -> Result<Option<String>>;
}

/// Resolves tokens from the `THERAKIT_API_TOKEN` environment variable
/// first, then the OS keyring for the configured profile.
///
/// An expired keyring token is treated as absent so callers get the
/// missing-token error rather than a server-side rejection.
pub struct KeyringTokenSource {
    profile: String,
}

impl KeyringTokenSource {
    /// Creates a source bound to the given profile name.
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }
}

impl Default for KeyringTokenSource {
    fn default() -> Self {
        Self::new("default")
    }
}

impl TokenSource for KeyringTokenSource {
    fn bearer_token(&self) -> Result<Option<String>> {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.is_empty() {
                tracing::debug!("Using bearer token from {}", TOKEN_ENV_VAR);
                return Ok(Some(token));
            }
        }

        match TokenStore.load_token(&self.profile)? {
            Some(stored) if stored.is_expired() => {
                tracing::warn!(profile = %self.profile, "Stored token is expired");
                Ok(None)
            }
            Some(stored) => Ok(Some(stored.token)),
            None => Ok(None),
        }
    }
}

/// Fixed-token source for tests and scripted invocations.
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    /// Wraps the given token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenSource for StaticTokenSource {
    fn bearer_token(&self) -> Result<Option<String>> {
        Ok(Some(self.token.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
