//! Events that can occur in a session

use super::state::MessageStamp;
use crate::attachment::ImageData;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserMessage {
        text: String,
        image: Option<ImageData>,
        stamp: MessageStamp,
    },
    TopicSelected {
        label: String,
    },

    // Tutor events
    StepsPlanned {
        labels: Vec<String>,
    },
    TutorReplied {
        text: String,
        stamp: MessageStamp,
        /// Outcome of the step-progression roll taken for this reply
        advance_step: bool,
    },
    TutorFailed {
        error: String,
        stamp: MessageStamp,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::UserMessage { .. } => "user_message",
            Event::TopicSelected { .. } => "topic_selected",
            Event::StepsPlanned { .. } => "steps_planned",
            Event::TutorReplied { .. } => "tutor_replied",
            Event::TutorFailed { .. } => "tutor_failed",
        }
    }
}
