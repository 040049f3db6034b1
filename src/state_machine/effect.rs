//! Effects produced by state transitions

use super::state::{Message, Step};
use crate::attachment::ImageData;
use crate::runtime::SessionEvent;

/// Effects to be executed after state transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Ask the tutor for a step plan for the opening problem
    PlanSteps { problem: String },

    /// Ask the tutor to continue the conversation
    RequestReply {
        transcript: Vec<Message>,
        image: Option<ImageData>,
    },

    /// Notify observers
    Notify(SessionEvent),
}

impl Effect {
    pub fn notify_message(message: &Message) -> Self {
        Effect::Notify(SessionEvent::MessageAppended {
            message: message.clone(),
        })
    }

    pub fn notify_steps(steps: &[Step]) -> Self {
        Effect::Notify(SessionEvent::StepsChanged {
            steps: steps.to_vec(),
        })
    }

    pub fn notify_loading(is_loading: bool) -> Self {
        Effect::Notify(SessionEvent::LoadingChanged { is_loading })
    }

    pub fn notify_topic(topic: Option<String>) -> Self {
        Effect::Notify(SessionEvent::TopicChanged { topic })
    }
}
