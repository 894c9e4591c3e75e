//! In-process fake practice API for unit tests
//!
//! This module provides [`FakeApi`], a scripted stand-in for the real
//! backend. Tests enqueue per-endpoint responses up front, wire the fake
//! into the code under test through `Arc<dyn PracticeApi>`, then assert on
//! call counts and captured request payloads afterwards.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use therakit::api::fake::FakeApi;
//! use therakit::api::PracticeApi;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let api = FakeApi::new();
//! api.push_students(Ok(vec![]));
//!
//! let listed = api.list_students().await.unwrap();
//! assert!(listed.is_empty());
//! assert_eq!(api.call_count("list_students"), 1);
//! # }
//! ```
//!
//! Endpoints the unit tests never script (enrollment and document handling,
//! which are covered by mock-server integration tests) return an
//! unscripted-call error; the call is still counted.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::types::{
    AiPreferences, AssignActivityRequest, AssignActivityResponse, BackendSession,
    ChatMessageRequest, ChatSessionCreated, ChatTurnResponse, ChildGoal, DocumentLink,
    DocumentRecord, EnrollmentReceipt, Learner, LearnerProfile, NotesQuery, SessionNote,
};
use crate::api::PracticeApi;
use crate::enroll::{DocumentUpload, EnrollmentForm};
use crate::error::Result;

/// Scripted in-process practice API.
///
/// Each endpoint pops its next queued response; an empty queue yields an
/// unscripted-call error so tests fail loudly instead of hanging on a
/// default. Captured payload vectors are public for direct assertion.
#[derive(Default)]
pub struct FakeApi {
    students: Mutex<VecDeque<Result<Vec<Learner>>>>,
    my_students: Mutex<VecDeque<Result<Vec<Learner>>>>,
    temp_students: Mutex<VecDeque<Result<Vec<Learner>>>>,
    sessions: Mutex<VecDeque<Result<Vec<BackendSession>>>>,
    todays_sessions: Mutex<VecDeque<Result<Vec<BackendSession>>>>,
    goals: Mutex<VecDeque<Result<Vec<ChildGoal>>>>,
    preferences: Mutex<VecDeque<Result<AiPreferences>>>,
    notes: Mutex<VecDeque<Result<Vec<SessionNote>>>>,
    create_session: Mutex<VecDeque<Result<ChatSessionCreated>>>,
    send_message: Mutex<VecDeque<Result<ChatTurnResponse>>>,
    assign: Mutex<VecDeque<Result<AssignActivityResponse>>>,

    calls: Mutex<HashMap<&'static str, usize>>,

    /// Every `(session_id, request)` pair passed to `send_chat_message`.
    pub sent_messages: Mutex<Vec<(String, ChatMessageRequest)>>,
    /// Every profile snapshot passed to `create_chat_session`.
    pub created_profiles: Mutex<Vec<LearnerProfile>>,
    /// Every assignment request passed to `assign_activity`.
    pub assignments: Mutex<Vec<AssignActivityRequest>>,
    /// Every `(learner_id, preferences)` pair passed to
    /// `save_ai_preferences`.
    pub saved_preferences: Mutex<Vec<(String, String)>>,
    /// Every query passed to `session_notes`.
    pub notes_queries: Mutex<Vec<NotesQuery>>,
}

impl FakeApi {
    /// Creates an empty fake with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_students(&self, response: Result<Vec<Learner>>) {
        self.students.lock().unwrap().push_back(response);
    }

    pub fn push_my_students(&self, response: Result<Vec<Learner>>) {
        self.my_students.lock().unwrap().push_back(response);
    }

    pub fn push_temp_students(&self, response: Result<Vec<Learner>>) {
        self.temp_students.lock().unwrap().push_back(response);
    }

    pub fn push_sessions(&self, response: Result<Vec<BackendSession>>) {
        self.sessions.lock().unwrap().push_back(response);
    }

    pub fn push_todays_sessions(&self, response: Result<Vec<BackendSession>>) {
        self.todays_sessions.lock().unwrap().push_back(response);
    }

    pub fn push_goals(&self, response: Result<Vec<ChildGoal>>) {
        self.goals.lock().unwrap().push_back(response);
    }

    pub fn push_preferences(&self, response: Result<AiPreferences>) {
        self.preferences.lock().unwrap().push_back(response);
    }

    pub fn push_notes(&self, response: Result<Vec<SessionNote>>) {
        self.notes.lock().unwrap().push_back(response);
    }

    pub fn push_create_session(&self, response: Result<ChatSessionCreated>) {
        self.create_session.lock().unwrap().push_back(response);
    }

    pub fn push_send_message(&self, response: Result<ChatTurnResponse>) {
        self.send_message.lock().unwrap().push_back(response);
    }

    pub fn push_assign(&self, response: Result<AssignActivityResponse>) {
        self.assign.lock().unwrap().push_back(response);
    }

    /// Number of times the named trait method was invoked.
    pub fn call_count(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    fn bump(&self, method: &'static str) {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
    }

    fn pop<T>(queue: &Mutex<VecDeque<Result<T>>>, method: &str) -> Result<T> {
        queue
            .lock()
            .expect("FakeApi queue lock poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(anyhow::anyhow!(
                    "FakeApi: no scripted response for {}",
                    method
                ))
            })
    }
}

#[async_trait]
impl PracticeApi for FakeApi {
    async fn list_students(&self) -> Result<Vec<Learner>> {
        self.bump("list_students");
        Self::pop(&self.students, "list_students")
    }

    async fn list_my_students(&self) -> Result<Vec<Learner>> {
        self.bump("list_my_students");
        Self::pop(&self.my_students, "list_my_students")
    }

    async fn list_temp_students(&self) -> Result<Vec<Learner>> {
        self.bump("list_temp_students");
        Self::pop(&self.temp_students, "list_temp_students")
    }

    async fn list_sessions(&self) -> Result<Vec<BackendSession>> {
        self.bump("list_sessions");
        Self::pop(&self.sessions, "list_sessions")
    }

    async fn list_todays_sessions(&self) -> Result<Vec<BackendSession>> {
        self.bump("list_todays_sessions");
        Self::pop(&self.todays_sessions, "list_todays_sessions")
    }

    async fn child_goals(&self, _learner_id: &str) -> Result<Vec<ChildGoal>> {
        self.bump("child_goals");
        Self::pop(&self.goals, "child_goals")
    }

    async fn ai_preferences(&self, _learner_id: &str) -> Result<AiPreferences> {
        self.bump("ai_preferences");
        Self::pop(&self.preferences, "ai_preferences")
    }

    async fn save_ai_preferences(&self, learner_id: &str, preferences: &str) -> Result<()> {
        self.bump("save_ai_preferences");
        self.saved_preferences
            .lock()
            .unwrap()
            .push((learner_id.to_string(), preferences.to_string()));
        Ok(())
    }

    async fn session_notes(&self, query: &NotesQuery) -> Result<Vec<SessionNote>> {
        self.bump("session_notes");
        self.notes_queries.lock().unwrap().push(query.clone());
        Self::pop(&self.notes, "session_notes")
    }

    async fn create_chat_session(&self, profile: &LearnerProfile) -> Result<ChatSessionCreated> {
        self.bump("create_chat_session");
        self.created_profiles.lock().unwrap().push(profile.clone());
        Self::pop(&self.create_session, "create_chat_session")
    }

    async fn send_chat_message(
        &self,
        session_id: &str,
        request: &ChatMessageRequest,
    ) -> Result<ChatTurnResponse> {
        self.bump("send_chat_message");
        self.sent_messages
            .lock()
            .unwrap()
            .push((session_id.to_string(), request.clone()));
        Self::pop(&self.send_message, "send_chat_message")
    }

    async fn assign_activity(
        &self,
        request: &AssignActivityRequest,
    ) -> Result<AssignActivityResponse> {
        self.bump("assign_activity");
        self.assignments.lock().unwrap().push(request.clone());
        Self::pop(&self.assign, "assign_activity")
    }

    async fn enroll_student(&self, _form: &EnrollmentForm) -> Result<EnrollmentReceipt> {
        self.bump("enroll_student");
        Err(anyhow::anyhow!(
            "FakeApi: no scripted response for enroll_student"
        ))
    }

    async fn upload_document(&self, _upload: &DocumentUpload) -> Result<DocumentRecord> {
        self.bump("upload_document");
        Err(anyhow::anyhow!(
            "FakeApi: no scripted response for upload_document"
        ))
    }

    async fn delete_document(&self, _file_id: &str) -> Result<()> {
        self.bump("delete_document");
        Err(anyhow::anyhow!(
            "FakeApi: no scripted response for delete_document"
        ))
    }

    async fn view_document(&self, _file_id: &str) -> Result<DocumentLink> {
        self.bump("view_document");
        Err(anyhow::anyhow!(
            "FakeApi: no scripted response for view_document"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_pop_in_order() {
        let api = FakeApi::new();
        api.push_students(Ok(vec![]));
        api.push_students(Err(anyhow::anyhow!("second call fails")));

        assert!(api.list_students().await.is_ok());
        assert!(api.list_students().await.is_err());
        assert_eq!(api.call_count("list_students"), 2);
    }

    #[tokio::test]
    async fn test_unscripted_call_is_an_error() {
        let api = FakeApi::new();
        let err = api.list_sessions().await.unwrap_err();
        assert!(err.to_string().contains("no scripted response"));
        assert_eq!(api.call_count("list_sessions"), 1);
    }

    #[tokio::test]
    async fn test_send_message_captures_payload() {
        let api = FakeApi::new();
        api.push_send_message(Ok(ChatTurnResponse {
            session_id: "abc".to_string(),
            messages: vec![],
        }));

        let request = ChatMessageRequest::new("hello");
        api.send_chat_message("abc", &request).await.unwrap();

        let sent = api.sent_messages.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "abc");
        assert_eq!(sent[0].1.message, "hello");
    }

    #[tokio::test]
    async fn test_save_preferences_always_succeeds_and_records() {
        let api = FakeApi::new();
        api.save_ai_preferences("c1", "short sessions").await.unwrap();

        let saved = api.saved_preferences.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0], ("c1".to_string(), "short sessions".to_string()));
    }

    #[test]
    fn test_fake_api_is_object_safe() {
        let api = FakeApi::new();
        let _boxed: Box<dyn PracticeApi> = Box::new(api);
    }
}
