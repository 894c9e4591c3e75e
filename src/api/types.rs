//! Wire types for the practice management API
//!
//! All request and response bodies exchanged with the backend live here.
//! Parsing is deliberately tolerant: optional fields default rather than
//! fail, because the backend evolves independently of this client.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Learners
// ---------------------------------------------------------------------------

/// A child enrolled in therapy services.
///
/// Returned by the student listing endpoints. Collections of learners are
/// replaced wholesale on refresh; the client never patches individual
/// records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Learner {
    /// Stable identifier, the key used everywhere else in the API.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Age in years.
    #[serde(default)]
    pub age: u32,

    /// Enrollment status.
    #[serde(default)]
    pub status: LearnerStatus,

    /// Ordered list of goal names shown on the learner card.
    #[serde(default)]
    pub goals: Vec<String>,

    /// Diagnosis details; shape varies per practice, so this stays opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_diagnosis: Option<serde_json::Value>,

    /// Per-tool assessment payloads keyed by tool name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub assessment_details: HashMap<String, serde_json::Value>,

    /// Optional photo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    /// Next scheduled session, as the backend's timestamp string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_session: Option<String>,
}

/// Learner enrollment status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LearnerStatus {
    #[default]
    Active,
    New,
    AssessmentDue,
    Inactive,
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

/// A tracked therapeutic objective scoped to one learner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildGoal {
    pub id: String,
    pub activity_name: String,

    #[serde(default)]
    pub activity_description: String,

    /// Free-form progress string from the backend; see [`ChildGoal::progress`]
    /// for the normalized reading.
    #[serde(default)]
    pub current_status: String,

    /// Therapy domain (e.g. "communication", "motor skills").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_frequency: Option<String>,

    #[serde(default)]
    pub total_attempts: u32,

    #[serde(default)]
    pub successful_attempts: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempted: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_started: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_mastered: Option<String>,
}

/// Normalized goal progress, derived from the free-form status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalProgress {
    NotStarted,
    InProgress,
    Mastered,
    Completed,
    Other,
}

impl ChildGoal {
    /// Normalizes the backend's free-form `current_status` into a
    /// [`GoalProgress`] bucket. The backend emits strings like
    /// `"In Progress"`, `"mastered!"`, or `"Complete"`; matching is
    /// case-insensitive substring containment.
    pub fn progress(&self) -> GoalProgress {
        let status = self.current_status.to_lowercase();
        if status.is_empty() || status.contains("not started") {
            GoalProgress::NotStarted
        } else if status.contains("master") {
            GoalProgress::Mastered
        } else if status.contains("complete") {
            GoalProgress::Completed
        } else if status.contains("progress") {
            GoalProgress::InProgress
        } else {
            GoalProgress::Other
        }
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// A scheduled or completed therapy appointment, read-only to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSession {
    pub id: String,
    pub child_id: String,

    #[serde(default)]
    pub therapist_id: String,

    /// Session date as `YYYY-MM-DD`.
    pub session_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    #[serde(default)]
    pub status: SessionStatus,

    #[serde(default)]
    pub planned_activities: u32,

    #[serde(default)]
    pub completed_activities: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Lifecycle status of a therapy session.
///
/// The backend's status vocabulary is open-ended; anything unrecognized
/// maps to `Unknown` rather than failing the whole collection parse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

// ---------------------------------------------------------------------------
// AI preferences and session notes
// ---------------------------------------------------------------------------

/// Free-text per-learner instructions for the activity assistant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AiPreferences {
    #[serde(default)]
    pub preferences: String,
}

/// Query body for the session-notes endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesQuery {
    pub child_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// A therapist note attached to a past session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionNote {
    pub session_id: String,
    pub session_date: String,

    #[serde(default)]
    pub therapist_notes: String,
}

// ---------------------------------------------------------------------------
// Assistant chat
// ---------------------------------------------------------------------------

/// Snapshot of a learner sent when opening an assistant session.
///
/// The backend seeds the conversation with this profile; it is captured
/// once at session creation and not kept in sync afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub name: String,

    #[serde(default)]
    pub age: u32,

    /// Goal names, combining the learner record with any cached goal data.
    #[serde(default)]
    pub goals: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_diagnosis: Option<serde_json::Value>,
}

impl LearnerProfile {
    /// Builds a profile snapshot from a learner record, merging in goal
    /// names fetched separately. Duplicate names are kept once, preserving
    /// the learner-record ordering.
    pub fn from_learner(learner: &Learner, goals: &[ChildGoal]) -> Self {
        let mut names = learner.goals.clone();
        for goal in goals {
            if !names.contains(&goal.activity_name) {
                names.push(goal.activity_name.clone());
            }
        }
        Self {
            name: learner.name.clone(),
            age: learner.age,
            goals: names,
            medical_diagnosis: learner.medical_diagnosis.clone(),
        }
    }
}

/// Body of `POST /api/activities/chat/session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub learner_profile: LearnerProfile,
}

/// Response of the session-create endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSessionCreated {
    pub session_id: String,
}

/// Body of `POST /api/activities/chat/session/{id}/message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_preferences: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_notes: Option<Vec<SessionNote>>,
}

impl ChatMessageRequest {
    /// Creates a bare message request with no attached context.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ai_preferences: None,
            session_notes: None,
        }
    }

    /// Attaches the learner's AI preference text.
    pub fn with_preferences(mut self, preferences: impl Into<String>) -> Self {
        self.ai_preferences = Some(preferences.into());
        self
    }

    /// Attaches recent session notes as conversation context.
    pub fn with_notes(mut self, notes: Vec<SessionNote>) -> Self {
        self.session_notes = Some(notes);
        self
    }
}

/// One assistant turn: the session id plus the messages it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurnResponse {
    pub session_id: String,

    #[serde(default)]
    pub messages: Vec<AssistantMessage>,
}

/// A single message from the assistant, tagged by `kind` on the wire.
///
/// One wire message maps to exactly one transcript entry; an `activities`
/// message carries its whole suggestion list in that single entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssistantMessage {
    Text {
        content: String,
    },
    Activities {
        activities: Vec<SuggestedActivity>,
    },
    System {
        content: String,
    },
}

/// An activity the assistant recommends assigning to the learner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestedActivity {
    /// Identifier used for the assignment idempotency guard.
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
}

// ---------------------------------------------------------------------------
// Activity assignment
// ---------------------------------------------------------------------------

/// Body of `POST /api/activities/assign`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignActivityRequest {
    pub activity: SuggestedActivity,
    pub child_id: String,
}

/// Response of the assignment endpoint. A 200 with `success: false` is a
/// business-rule rejection, not a transport error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignActivityResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Enrollment and documents
// ---------------------------------------------------------------------------

/// Response of `POST /api/enroll-student`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnrollmentReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learner_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A stored document as returned by the upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub file_id: String,
    pub file_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A short-lived view link for a stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLink {
    pub url: String,
}
