//! Activity assistant conversation
//!
//! The assistant suggests therapy activities for one learner through a
//! turn-based chat. [`flow::AssistantFlow`] owns the session lifecycle and
//! transcript; [`transcript`] holds the message model.

pub mod flow;
pub mod transcript;

pub use flow::{AssignmentOutcome, AssistantFlow, SessionPhase};
pub use transcript::{ChatMessage, MessageBody, MessageStatus, Role, Transcript};
