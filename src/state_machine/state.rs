//! Session state types

use crate::attachment::ImageData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Messages
// ============================================================================

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Identity and creation time for a new message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageStamp {
    pub id: String,
    pub timestamp: DateTime<Utc>,
}

impl MessageStamp {
    pub fn now() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// One turn in the conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Inline image as a data URI, only on user turns that attached one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Message {
    pub fn user(stamp: MessageStamp, content: impl Into<String>, image: Option<&ImageData>) -> Self {
        Self {
            id: stamp.id,
            role: Role::User,
            content: content.into(),
            timestamp: stamp.timestamp,
            image_url: image.map(ImageData::to_data_uri),
        }
    }

    pub fn assistant(stamp: MessageStamp, content: impl Into<String>) -> Self {
        Self {
            id: stamp.id,
            role: Role::Assistant,
            content: content.into(),
            timestamp: stamp.timestamp,
            image_url: None,
        }
    }
}

// ============================================================================
// Learning journey
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Current,
    Completed,
}

/// One node of the learning journey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub label: String,
    pub status: StepStatus,
}

/// Map plan labels to steps: the first is current, the rest pending
pub fn steps_from_labels<I, S>(labels: I) -> Vec<Step>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    labels
        .into_iter()
        .enumerate()
        .map(|(i, label)| Step {
            id: i.to_string(),
            label: label.into(),
            status: if i == 0 {
                StepStatus::Current
            } else {
                StepStatus::Pending
            },
        })
        .collect()
}

// ============================================================================
// Session
// ============================================================================

/// Where the session is in its send cycle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Phase {
    /// Nothing outstanding; the user may send
    #[default]
    Idle,
    /// First message of the session: waiting for the step plan
    PlanningSteps {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<ImageData>,
    },
    /// Waiting for the tutor's reply
    AwaitingReply,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::PlanningSteps { .. } => "planning_steps",
            Phase::AwaitingReply => "awaiting_reply",
        }
    }
}

/// Everything the interface renders. Lives for one UI session; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Append-only; insertion order is the transcript order
    pub messages: Vec<Message>,
    pub phase: Phase,
    pub steps: Vec<Step>,
    /// Set only by explicit topic selection
    pub current_topic: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly while a tutor round trip is outstanding
    pub fn is_loading(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    pub fn current_step_index(&self) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| s.status == StepStatus::Current)
    }

    /// Complete the current step and promote the next one.
    ///
    /// Returns false when no step is current (empty plan or journey done).
    pub fn advance_step(&mut self) -> bool {
        let Some(idx) = self.current_step_index() else {
            return false;
        };
        self.steps[idx].status = StepStatus::Completed;
        if let Some(next) = self.steps.get_mut(idx + 1) {
            next.status = StepStatus::Current;
        }
        true
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.messages.clone(),
            is_loading: self.is_loading(),
            steps: self.steps.clone(),
            current_topic: self.current_topic.clone(),
        }
    }
}

/// Wire form of the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub is_loading: bool,
    pub steps: Vec<Step>,
    pub current_topic: Option<String>,
}
