//! Practice API abstraction and implementations
//!
//! This module defines the [`PracticeApi`] trait that the data store and
//! assistant flow are written against. Concrete implementations live in
//! submodules:
//!
//! - [`http::HttpApi`] -- reqwest-backed client for the real backend.
//! - [`fake::FakeApi`] -- scripted in-process fake used in tests (cfg(test)
//!   only).
//!
//! # Design
//!
//! The trait has one method per backend endpoint, taking and returning the
//! typed bodies from [`types`]. Authentication, base-URL joining, and
//! status-code mapping are the responsibility of each implementation; the
//! store and flow never see raw HTTP.
//!
//! # Canonical Import Path
//!
//! ```no_run
//! use therakit::api::PracticeApi;
//! ```

use crate::error::Result;

pub mod http;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use http::HttpApi;
pub use types::{
    AiPreferences, AssignActivityRequest, AssignActivityResponse, AssistantMessage,
    BackendSession, ChatMessageRequest, ChatSessionCreated, ChatTurnResponse, ChildGoal,
    DocumentLink, DocumentRecord, EnrollmentReceipt, GoalProgress, Learner, LearnerProfile,
    LearnerStatus, NotesQuery, SessionNote, SessionStatus, SuggestedActivity,
};

/// Abstraction over the practice management REST API.
///
/// Implemented by [`http::HttpApi`] for production and [`fake::FakeApi`] in
/// tests. Used polymorphically through `Arc<dyn PracticeApi>`.
#[async_trait::async_trait]
pub trait PracticeApi: Send + Sync {
    /// `GET /students` -- every learner visible to the signed-in account.
    async fn list_students(&self) -> Result<Vec<Learner>>;

    /// `GET /my-students` -- learners assigned to the signed-in therapist.
    async fn list_my_students(&self) -> Result<Vec<Learner>>;

    /// `GET /temp-students` -- learners mid-enrollment, not yet confirmed.
    async fn list_temp_students(&self) -> Result<Vec<Learner>>;

    /// `GET /sessions` -- all therapy sessions.
    async fn list_sessions(&self) -> Result<Vec<BackendSession>>;

    /// `GET /sessions/today` -- sessions scheduled for the current day.
    async fn list_todays_sessions(&self) -> Result<Vec<BackendSession>>;

    /// `GET /api/learners/{id}/goals` -- the learner's tracked goals.
    async fn child_goals(&self, learner_id: &str) -> Result<Vec<ChildGoal>>;

    /// `GET /api/learners/{id}/ai-preferences` -- free-text assistant
    /// instructions saved for the learner.
    async fn ai_preferences(&self, learner_id: &str) -> Result<AiPreferences>;

    /// `POST /api/learners/{id}/ai-preferences` -- replaces the saved
    /// instructions.
    async fn save_ai_preferences(&self, learner_id: &str, preferences: &str) -> Result<()>;

    /// `POST /api/sessions/notes` -- therapist notes matching the query.
    async fn session_notes(&self, query: &NotesQuery) -> Result<Vec<SessionNote>>;

    /// `POST /api/activities/chat/session` -- opens an assistant session
    /// seeded with the learner profile snapshot.
    ///
    /// # Errors
    ///
    /// Any failure leaves no session behind; callers retry by sending again.
    async fn create_chat_session(&self, profile: &LearnerProfile) -> Result<ChatSessionCreated>;

    /// `POST /api/activities/chat/session/{id}/message` -- one conversation
    /// turn against an existing session.
    async fn send_chat_message(
        &self,
        session_id: &str,
        request: &ChatMessageRequest,
    ) -> Result<ChatTurnResponse>;

    /// `POST /api/activities/assign` -- assigns a suggested activity to a
    /// learner. A response with `success: false` is returned as `Ok`; the
    /// caller decides how to surface the rejection.
    async fn assign_activity(
        &self,
        request: &AssignActivityRequest,
    ) -> Result<AssignActivityResponse>;

    /// `POST /api/enroll-student` -- submits a completed enrollment form.
    async fn enroll_student(&self, form: &crate::enroll::EnrollmentForm)
        -> Result<EnrollmentReceipt>;

    /// `POST /api/upload-document` -- uploads a document, optionally tied to
    /// a learner.
    async fn upload_document(
        &self,
        upload: &crate::enroll::DocumentUpload,
    ) -> Result<DocumentRecord>;

    /// `DELETE /api/delete-file` -- removes a stored document.
    async fn delete_document(&self, file_id: &str) -> Result<()>;

    /// `POST /api/view-file` -- returns a short-lived view link.
    async fn view_document(&self, file_id: &str) -> Result<DocumentLink>;
}
