//! Chat transcript model
//!
//! An ordered list of messages exchanged with the activity assistant.
//! Wire messages map one-to-one onto transcript entries: a suggestion
//! list arrives as a single `activities` entry carrying the whole list,
//! never one entry per activity.

use crate::api::{AssistantMessage, SuggestedActivity};
use serde::{Deserialize, Serialize};

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Delivery status of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Normal,
    Error,
}

/// Payload of a transcript entry, mirroring the wire message kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageBody {
    Text { content: String },
    Activities { activities: Vec<SuggestedActivity> },
    System { content: String },
}

impl MessageBody {
    /// Stable kind name for rendering and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MessageBody::Text { .. } => "text",
            MessageBody::Activities { .. } => "activities",
            MessageBody::System { .. } => "system",
        }
    }
}

/// One entry in the conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Client-generated identifier, used to target retries.
    pub id: String,

    pub role: Role,

    #[serde(flatten)]
    pub body: MessageBody,

    pub status: MessageStatus,

    /// Original user input, present only on retryable error entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_payload: Option<String>,
}

impl ChatMessage {
    fn next_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// A message the user typed, shown optimistically before delivery.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Self::next_id(),
            role: Role::User,
            body: MessageBody::Text {
                content: text.into(),
            },
            status: MessageStatus::Normal,
            retry_payload: None,
        }
    }

    /// A delivered assistant message, one entry per wire message.
    pub fn from_wire(message: AssistantMessage) -> Self {
        let body = match message {
            AssistantMessage::Text { content } => MessageBody::Text { content },
            AssistantMessage::Activities { activities } => MessageBody::Activities { activities },
            AssistantMessage::System { content } => MessageBody::System { content },
        };
        Self {
            id: Self::next_id(),
            role: Role::Assistant,
            body,
            status: MessageStatus::Normal,
            retry_payload: None,
        }
    }

    /// An informational system entry (e.g. an assignment confirmation).
    pub fn system_info(content: impl Into<String>) -> Self {
        Self {
            id: Self::next_id(),
            role: Role::Assistant,
            body: MessageBody::System {
                content: content.into(),
            },
            status: MessageStatus::Normal,
            retry_payload: None,
        }
    }

    /// A non-retryable error entry; the user re-sends to try again.
    pub fn system_error(content: impl Into<String>) -> Self {
        Self {
            id: Self::next_id(),
            role: Role::Assistant,
            body: MessageBody::System {
                content: content.into(),
            },
            status: MessageStatus::Error,
            retry_payload: None,
        }
    }

    /// A retryable delivery failure carrying the original user input.
    pub fn send_error(content: impl Into<String>, retry_payload: impl Into<String>) -> Self {
        Self {
            id: Self::next_id(),
            role: Role::Assistant,
            body: MessageBody::Text {
                content: content.into(),
            },
            status: MessageStatus::Error,
            retry_payload: Some(retry_payload.into()),
        }
    }

    /// True when `retry(message_id)` can target this entry.
    pub fn is_retryable(&self) -> bool {
        self.status == MessageStatus::Error && self.retry_payload.is_some()
    }
}

/// Ordered conversation history for one assistant session.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry at the end.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// All entries in order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn get(&self, id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Removes the entry with the given id, preserving order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<ChatMessage> {
        let index = self.messages.iter().position(|m| m.id == id)?;
        Some(self.messages.remove(index))
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// The most recent retryable error entry, if any.
    pub fn last_retryable(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.is_retryable())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
