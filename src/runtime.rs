//! Conversation Controller runtime
//!
//! Owns the single session, feeds events through the pure transition
//! function, executes the resulting effects against the tutor gateway, and
//! broadcasts every change to live observers.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::*;

use crate::state_machine::{Message, SessionSnapshot, Step};
use crate::tutor::TutorGateway;
use serde::Serialize;
use std::sync::Arc;

/// Production runtime with type-erased collaborators
pub type SharedRuntime = SessionRuntime<Arc<dyn TutorGateway>, Arc<dyn StepProgression>>;

/// Events sent to session observers (SSE clients, the terminal UI)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Full state for a newly attached observer
    Init { snapshot: SessionSnapshot },
    MessageAppended { message: Message },
    StepsChanged { steps: Vec<Step> },
    LoadingChanged { is_loading: bool },
    TopicChanged { topic: Option<String> },
    /// A rejected intent, for the observer that sent it
    Error { message: String },
}

impl SessionEvent {
    /// Event name on the wire
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Init { .. } => "init",
            SessionEvent::MessageAppended { .. } => "message",
            SessionEvent::StepsChanged { .. } => "steps",
            SessionEvent::LoadingChanged { .. } => "loading",
            SessionEvent::TopicChanged { .. } => "topic",
            SessionEvent::Error { .. } => "error",
        }
    }
}
