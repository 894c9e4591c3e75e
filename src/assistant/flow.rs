//! Assistant conversation state machine
//!
//! Drives a turn-based conversation against a backend session resource,
//! scoped to one learner. The phase type makes illegal transitions
//! unrepresentable: there is no way to deliver a message while a session
//! is being created or another turn is in flight.
//!
//! The flow owns its transcript and lives as long as its owner; dropping
//! it is the only way the conversation resets.

use crate::api::{
    AssignActivityRequest, ChatMessageRequest, LearnerProfile, NotesQuery, PracticeApi,
    SuggestedActivity,
};
use crate::assistant::transcript::{ChatMessage, Transcript};
use crate::config::AssistantConfig;
use crate::error::{Result, TherakitError};
use crate::store::DataStore;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where the conversation currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// No backend session exists yet; the first send creates one.
    NoSession,
    /// Session creation is in flight.
    Initializing,
    /// A session exists and no turn is in flight.
    Ready { session_id: String },
    /// A message has been posted and the reply is pending.
    Awaiting { session_id: String },
}

impl SessionPhase {
    /// Short phase name for errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::NoSession => "no_session",
            SessionPhase::Initializing => "initializing",
            SessionPhase::Ready { .. } => "ready",
            SessionPhase::Awaiting { .. } => "awaiting",
        }
    }

    /// True while a turn or session creation is in flight; doubles as the
    /// typing indicator.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionPhase::Initializing | SessionPhase::Awaiting { .. })
    }

    /// The backend session id, once one exists.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            SessionPhase::Ready { session_id } | SessionPhase::Awaiting { session_id } => {
                Some(session_id)
            }
            _ => None,
        }
    }
}

/// Result of an activity assignment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOutcome {
    /// The backend accepted the assignment.
    Assigned,
    /// The activity id was already assigned; no request was made.
    AlreadyAssigned,
    /// The backend rejected the assignment or the request failed.
    Failed,
}

/// Conversation flow for one learner's assistant session.
pub struct AssistantFlow {
    api: Arc<dyn PracticeApi>,
    store: Arc<DataStore>,
    learner_id: String,
    phase: SessionPhase,
    transcript: Transcript,
    assigned: HashSet<String>,
    attach_notes: bool,
    notes_window_days: u32,
    attach_preferences: bool,
}

impl AssistantFlow {
    /// Creates a flow in `NoSession` with an empty transcript.
    pub fn new(
        api: Arc<dyn PracticeApi>,
        store: Arc<DataStore>,
        learner_id: impl Into<String>,
    ) -> Self {
        let defaults = AssistantConfig::default();
        Self {
            api,
            store,
            learner_id: learner_id.into(),
            phase: SessionPhase::NoSession,
            transcript: Transcript::new(),
            assigned: HashSet::new(),
            attach_notes: defaults.attach_session_notes,
            notes_window_days: defaults.notes_window_days,
            attach_preferences: defaults.attach_ai_preferences,
        }
    }

    /// Applies assistant configuration (context attachment knobs).
    pub fn with_config(mut self, config: &AssistantConfig) -> Self {
        self.attach_notes = config.attach_session_notes;
        self.notes_window_days = config.notes_window_days;
        self.attach_preferences = config.attach_ai_preferences;
        self
    }

    pub fn learner_id(&self) -> &str {
        &self.learner_id
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Typing indicator: true while a turn is in flight.
    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Activity ids accepted by the backend in this conversation.
    pub fn assigned_ids(&self) -> &HashSet<String> {
        &self.assigned
    }

    /// Sends a user message, creating the backend session on first use.
    ///
    /// Returns every transcript entry this call appended, the optimistic
    /// user message included. Delivery failures do not surface as `Err`;
    /// they are recorded in the transcript as error entries (retryable
    /// when a session already existed). `Err` is returned only when the
    /// flow is mid-turn.
    pub async fn send(&mut self, text: &str) -> Result<Vec<ChatMessage>> {
        match self.phase.clone() {
            SessionPhase::Initializing | SessionPhase::Awaiting { .. } => {
                crate::metrics::record_assistant_turn("rejected");
                Err(TherakitError::AssistantBusy {
                    phase: self.phase.name().to_string(),
                }
                .into())
            }
            SessionPhase::NoSession => {
                let user = ChatMessage::user(text);
                self.transcript.push(user.clone());
                let mut appended = vec![user];

                self.phase = SessionPhase::Initializing;
                debug!(learner_id = %self.learner_id, "Creating assistant session");

                match self.create_session().await {
                    Ok(session_id) => {
                        debug!(session_id = %session_id, "Assistant session created");
                        self.phase = SessionPhase::Ready {
                            session_id: session_id.clone(),
                        };
                        appended.extend(self.deliver(&session_id, text).await);
                        Ok(appended)
                    }
                    Err(e) => {
                        self.phase = SessionPhase::NoSession;
                        crate::metrics::record_assistant_turn("failure");
                        warn!(error = %e, "Assistant session creation failed");
                        let entry = ChatMessage::system_error(format!(
                            "Could not start the assistant session: {}. Send again to retry.",
                            e
                        ));
                        self.transcript.push(entry.clone());
                        appended.push(entry);
                        Ok(appended)
                    }
                }
            }
            SessionPhase::Ready { session_id } => {
                let user = ChatMessage::user(text);
                self.transcript.push(user.clone());
                let mut appended = vec![user];
                appended.extend(self.deliver(&session_id, text).await);
                Ok(appended)
            }
        }
    }

    /// Re-runs a failed delivery without re-appending the user message.
    ///
    /// Valid only for an error entry carrying a retry payload. The session
    /// captured when the failure happened is reused. On success the error
    /// entry is removed and the responses appended; on failure a fresh
    /// error entry with the same payload takes its place.
    pub async fn retry(&mut self, message_id: &str) -> Result<Vec<ChatMessage>> {
        if self.phase.is_busy() {
            return Err(TherakitError::AssistantBusy {
                phase: self.phase.name().to_string(),
            }
            .into());
        }

        let payload = match self.transcript.get(message_id) {
            None => {
                return Err(
                    TherakitError::Assistant(format!("No message with id {}", message_id)).into(),
                )
            }
            Some(entry) => match &entry.retry_payload {
                Some(payload) => payload.clone(),
                None => {
                    return Err(TherakitError::Assistant(
                        "That message cannot be retried".to_string(),
                    )
                    .into())
                }
            },
        };

        let session_id = match &self.phase {
            SessionPhase::Ready { session_id } => session_id.clone(),
            _ => {
                return Err(TherakitError::Assistant(
                    "No active session to retry into".to_string(),
                )
                .into())
            }
        };

        debug!(message_id, "Retrying failed delivery");
        self.transcript.remove(message_id);
        Ok(self.deliver(&session_id, &payload).await)
    }

    /// Assigns a suggested activity to this learner.
    ///
    /// An id that was already assigned is a no-op: no request, no new
    /// transcript entry. A successful assignment appends a confirmation
    /// and force-refreshes the learner's goals in the shared store; a
    /// failure appends a message naming the activity and leaves retrying
    /// to the user.
    pub async fn assign_activity(&mut self, activity: &SuggestedActivity) -> AssignmentOutcome {
        if self.assigned.contains(&activity.id) {
            debug!(activity_id = %activity.id, "Activity already assigned; skipping");
            crate::metrics::record_assignment("duplicate");
            return AssignmentOutcome::AlreadyAssigned;
        }

        let request = AssignActivityRequest {
            activity: activity.clone(),
            child_id: self.learner_id.clone(),
        };

        match self.api.assign_activity(&request).await {
            Ok(response) if response.success => {
                self.assigned.insert(activity.id.clone());
                crate::metrics::record_assignment("assigned");
                debug!(activity_id = %activity.id, "Activity assigned");

                self.transcript.push(ChatMessage::system_info(format!(
                    "Assigned \"{}\" to the learner's goals.",
                    activity.name
                )));

                // The one write-back into the shared store.
                if let Err(e) = self.store.goals_for_learner(&self.learner_id, true).await {
                    warn!(error = %e, "Goals refresh after assignment failed");
                }

                AssignmentOutcome::Assigned
            }
            Ok(response) => {
                crate::metrics::record_assignment("failure");
                let reason = response
                    .message
                    .unwrap_or_else(|| "the server declined the request".to_string());
                warn!(activity_id = %activity.id, reason = %reason, "Assignment rejected");

                self.transcript.push(ChatMessage::system_error(format!(
                    "Could not assign \"{}\": {}. Try assigning it again.",
                    activity.name, reason
                )));
                AssignmentOutcome::Failed
            }
            Err(e) => {
                crate::metrics::record_assignment("failure");
                warn!(activity_id = %activity.id, error = %e, "Assignment request failed");

                self.transcript.push(ChatMessage::system_error(format!(
                    "Could not assign \"{}\": {}. Try assigning it again.",
                    activity.name, e
                )));
                AssignmentOutcome::Failed
            }
        }
    }

    async fn create_session(&self) -> Result<String> {
        let profile = self.profile_snapshot();
        let created = self.api.create_chat_session(&profile).await?;
        Ok(created.session_id)
    }

    /// Snapshots the learner's profile and cached goals from the store.
    ///
    /// The snapshot is taken once per session creation; later store
    /// refreshes do not feed back into an open session.
    fn profile_snapshot(&self) -> LearnerProfile {
        let goals = self
            .store
            .goals(&self.learner_id)
            .map(|entry| entry.items)
            .unwrap_or_default();

        let roster = self.store.learners();
        let assigned = self.store.my_students();
        let unassigned = self.store.temp_students();
        let learner = roster
            .items
            .iter()
            .chain(assigned.items.iter())
            .chain(unassigned.items.iter())
            .find(|l| l.id == self.learner_id);

        match learner {
            Some(learner) => LearnerProfile::from_learner(learner, &goals),
            None => {
                debug!(learner_id = %self.learner_id, "Learner not in store; using minimal profile");
                LearnerProfile {
                    name: self.learner_id.clone(),
                    age: 0,
                    goals: goals.iter().map(|g| g.activity_name.clone()).collect(),
                    medical_diagnosis: None,
                }
            }
        }
    }

    /// Posts one message to an existing session and applies the outcome.
    ///
    /// Holds `Awaiting` for the duration of the round-trip, then always
    /// returns to `Ready`. Returns the transcript entries it appended.
    async fn deliver(&mut self, session_id: &str, text: &str) -> Vec<ChatMessage> {
        self.phase = SessionPhase::Awaiting {
            session_id: session_id.to_string(),
        };

        let request = self.build_request(text).await;
        let result = self.api.send_chat_message(session_id, &request).await;

        self.phase = SessionPhase::Ready {
            session_id: session_id.to_string(),
        };

        match result {
            Ok(turn) => {
                crate::metrics::record_assistant_turn("success");
                debug!(count = turn.messages.len(), "Assistant turn delivered");

                let mut appended = Vec::with_capacity(turn.messages.len());
                for wire in turn.messages {
                    let entry = ChatMessage::from_wire(wire);
                    self.transcript.push(entry.clone());
                    appended.push(entry);
                }
                appended
            }
            Err(e) => {
                crate::metrics::record_assistant_turn("failure");
                warn!(error = %e, "Assistant message delivery failed");

                let entry = ChatMessage::send_error(
                    format!("The assistant did not answer: {}", e),
                    text,
                );
                self.transcript.push(entry.clone());
                vec![entry]
            }
        }
    }

    /// Builds the message request, attaching optional context.
    ///
    /// Context fetches are best-effort: a failed preferences or notes
    /// lookup drops the attachment rather than failing the send.
    async fn build_request(&self, text: &str) -> ChatMessageRequest {
        let mut request = ChatMessageRequest::new(text);

        if self.attach_preferences {
            match self.api.ai_preferences(&self.learner_id).await {
                Ok(prefs) if !prefs.preferences.is_empty() => {
                    request = request.with_preferences(prefs.preferences);
                }
                Ok(_) => {}
                Err(e) => debug!(error = %e, "Skipping AI preferences attachment"),
            }
        }

        if self.attach_notes {
            let end = Utc::now().date_naive();
            let start = end - chrono::Duration::days(i64::from(self.notes_window_days));
            let query = NotesQuery {
                child_id: self.learner_id.clone(),
                start_date: Some(start.format("%Y-%m-%d").to_string()),
                end_date: Some(end.format("%Y-%m-%d").to_string()),
            };
            match self.api.session_notes(&query).await {
                Ok(notes) if !notes.is_empty() => {
                    request = request.with_notes(notes);
                }
                Ok(_) => {}
                Err(e) => debug!(error = %e, "Skipping session notes attachment"),
            }
        }

        request
    }
}
