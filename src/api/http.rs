//! HTTP implementation of the practice API
//!
//! This module implements [`PracticeApi`] against the real backend using
//! reqwest. Every request resolves the bearer token through the injected
//! [`TokenSource`] before any network I/O; a missing token fails fast with
//! the authentication error rather than producing a 401 round-trip.

use crate::api::types::{
    AiPreferences, AssignActivityRequest, AssignActivityResponse, BackendSession,
    ChatMessageRequest, ChatSessionCreated, ChatTurnResponse, ChildGoal, CreateSessionRequest,
    DocumentLink, DocumentRecord, EnrollmentReceipt, Learner, LearnerProfile, NotesQuery,
    SessionNote,
};
use crate::api::PracticeApi;
use crate::auth::TokenSource;
use crate::config::ApiConfig;
use crate::enroll::{DocumentUpload, EnrollmentForm};
use crate::error::{Result, TherakitError};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Reqwest-backed practice API client.
///
/// Holds a connection-pooled [`Client`] configured with the timeout and
/// user agent, the validated base URL, and the token source consulted per
/// request.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use therakit::api::HttpApi;
/// use therakit::auth::KeyringTokenSource;
/// use therakit::config::ApiConfig;
///
/// # fn example() -> therakit::error::Result<()> {
/// let api = HttpApi::new(&ApiConfig::default(), Arc::new(KeyringTokenSource::default()))?;
/// # Ok(())
/// # }
/// ```
pub struct HttpApi {
    client: Client,
    base_url: url::Url,
    tokens: Arc<dyn TokenSource>,
}

impl HttpApi {
    /// Create a new HTTP client for the practice API
    ///
    /// # Arguments
    ///
    /// * `config` - API endpoint configuration (base URL, timeout)
    /// * `tokens` - Bearer-token source consulted before each request
    ///
    /// # Errors
    ///
    /// Returns error if the base URL does not parse or HTTP client
    /// initialization fails
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let base_url = url::Url::parse(&config.base_url).map_err(|e| {
            TherakitError::Config(format!("Invalid api.base_url: {}: {}", config.base_url, e))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("therakit/0.2.0")
            .build()
            .map_err(|e| TherakitError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized practice API client: base_url={}", base_url);

        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    /// Resolves the bearer token, failing fast when none is stored.
    fn bearer(&self) -> Result<String> {
        match self.tokens.bearer_token()? {
            Some(token) => Ok(token),
            None => Err(TherakitError::no_access_token().into()),
        }
    }

    fn endpoint(&self, path: &str) -> Result<url::Url> {
        self.base_url
            .join(path)
            .map_err(|e| TherakitError::Config(format!("Invalid endpoint path {}: {}", path, e)).into())
    }

    /// Maps a non-2xx response to [`TherakitError::Api`], preferring the
    /// JSON `detail` field over raw body text.
    async fn api_error(response: reqwest::Response) -> TherakitError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
            .unwrap_or(body);
        tracing::error!("Practice API returned error {}: {}", status, message);
        TherakitError::Api { status, message }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await.into());
        }

        let body = response.text().await.map_err(TherakitError::Http)?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse practice API response: {}", e);
            TherakitError::Serialization(e).into()
        })
    }

    async fn expect_success(response: reqwest::Response) -> Result<()> {
        if !response.status().is_success() {
            return Err(Self::api_error(response).await.into());
        }
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let token = self.bearer()?;
        let url = self.endpoint(path)?;
        tracing::debug!("GET {}", path);

        let response = self
            .client
            .get(url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(TherakitError::Http)?;

        Self::decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let token = self.bearer()?;
        let url = self.endpoint(path)?;
        tracing::debug!("POST {}", path);

        let response = self
            .client
            .post(url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await
            .map_err(TherakitError::Http)?;

        Self::decode(response).await
    }

    async fn post_no_content<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let token = self.bearer()?;
        let url = self.endpoint(path)?;
        tracing::debug!("POST {}", path);

        let response = self
            .client
            .post(url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await
            .map_err(TherakitError::Http)?;

        Self::expect_success(response).await
    }
}

#[async_trait]
impl PracticeApi for HttpApi {
    async fn list_students(&self) -> Result<Vec<Learner>> {
        self.get_json("/students").await
    }

    async fn list_my_students(&self) -> Result<Vec<Learner>> {
        self.get_json("/my-students").await
    }

    async fn list_temp_students(&self) -> Result<Vec<Learner>> {
        self.get_json("/temp-students").await
    }

    async fn list_sessions(&self) -> Result<Vec<BackendSession>> {
        self.get_json("/sessions").await
    }

    async fn list_todays_sessions(&self) -> Result<Vec<BackendSession>> {
        self.get_json("/sessions/today").await
    }

    async fn child_goals(&self, learner_id: &str) -> Result<Vec<ChildGoal>> {
        self.get_json(&format!("/api/learners/{}/goals", learner_id))
            .await
    }

    async fn ai_preferences(&self, learner_id: &str) -> Result<AiPreferences> {
        self.get_json(&format!("/api/learners/{}/ai-preferences", learner_id))
            .await
    }

    async fn save_ai_preferences(&self, learner_id: &str, preferences: &str) -> Result<()> {
        #[derive(Serialize)]
        struct SavePreferencesRequest<'a> {
            preferences: &'a str,
        }

        self.post_no_content(
            &format!("/api/learners/{}/ai-preferences", learner_id),
            &SavePreferencesRequest { preferences },
        )
        .await
    }

    async fn session_notes(&self, query: &NotesQuery) -> Result<Vec<SessionNote>> {
        self.post_json("/api/sessions/notes", query).await
    }

    async fn create_chat_session(&self, profile: &LearnerProfile) -> Result<ChatSessionCreated> {
        let request = CreateSessionRequest {
            learner_profile: profile.clone(),
        };
        self.post_json("/api/activities/chat/session", &request).await
    }

    async fn send_chat_message(
        &self,
        session_id: &str,
        request: &ChatMessageRequest,
    ) -> Result<ChatTurnResponse> {
        self.post_json(
            &format!("/api/activities/chat/session/{}/message", session_id),
            request,
        )
        .await
    }

    async fn assign_activity(
        &self,
        request: &AssignActivityRequest,
    ) -> Result<AssignActivityResponse> {
        self.post_json("/api/activities/assign", request).await
    }

    async fn enroll_student(&self, form: &EnrollmentForm) -> Result<EnrollmentReceipt> {
        self.post_json("/api/enroll-student", form).await
    }

    async fn upload_document(&self, upload: &DocumentUpload) -> Result<DocumentRecord> {
        self.post_json("/api/upload-document", upload).await
    }

    async fn delete_document(&self, file_id: &str) -> Result<()> {
        #[derive(Serialize)]
        struct DeleteFileRequest<'a> {
            file_id: &'a str,
        }

        let token = self.bearer()?;
        let url = self.endpoint("/api/delete-file")?;
        tracing::debug!("DELETE /api/delete-file");

        let response = self
            .client
            .delete(url)
            .bearer_auth(&token)
            .json(&DeleteFileRequest { file_id })
            .send()
            .await
            .map_err(TherakitError::Http)?;

        Self::expect_success(response).await
    }

    async fn view_document(&self, file_id: &str) -> Result<DocumentLink> {
        #[derive(Serialize)]
        struct ViewFileRequest<'a> {
            file_id: &'a str,
        }

        self.post_json("/api/view-file", &ViewFileRequest { file_id })
            .await
    }
}
