//! Pure state transition function
//!
//! Given the same state and event, `transition` always produces the same
//! new state and effects. Ids, clocks, and dice rolls arrive inside events.

use super::state::{steps_from_labels, Message, Phase, SessionState};
use super::{Effect, Event};
use thiserror::Error;

/// Shown in place of a reply when the tutor call fails
pub const REPLY_ERROR_MESSAGE: &str =
    "I encountered an error. Could you please check your connection and try again?";

/// Steps only advance once the history before the latest user turn is
/// longer than this
pub const STEP_ADVANCE_MIN_HISTORY: usize = 3;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("The tutor is still answering; wait for the reply before sending again")]
    Busy,
    #[error("Nothing to send: add some text or attach an image")]
    EmptyMessage,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(state: &SessionState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (&state.phase, event) {
        // ============================================================
        // Topic selection: cosmetic, allowed in any phase
        // ============================================================
        (_, Event::TopicSelected { label }) => {
            let mut next = state.clone();
            next.current_topic = Some(label);
            let topic = next.current_topic.clone();
            Ok(TransitionResult::new(next).with_effect(Effect::notify_topic(topic)))
        }

        // ============================================================
        // User Message Handling
        // ============================================================
        (Phase::Idle, Event::UserMessage { text, image, stamp }) => {
            if text.trim().is_empty() && image.is_none() {
                return Err(TransitionError::EmptyMessage);
            }

            let first_message = state.messages.is_empty();
            let mut next = state.clone();
            let message = Message::user(stamp, text.clone(), image.as_ref());
            next.messages.push(message.clone());

            let (phase, request) = if first_message {
                (
                    Phase::PlanningSteps {
                        image: image.clone(),
                    },
                    Effect::PlanSteps { problem: text },
                )
            } else {
                (
                    Phase::AwaitingReply,
                    Effect::RequestReply {
                        transcript: next.messages.clone(),
                        image,
                    },
                )
            };
            next.phase = phase;

            Ok(TransitionResult::new(next)
                .with_effect(Effect::notify_message(&message))
                .with_effect(Effect::notify_loading(true))
                .with_effect(request))
        }

        // One round trip at a time
        (Phase::PlanningSteps { .. } | Phase::AwaitingReply, Event::UserMessage { .. }) => {
            Err(TransitionError::Busy)
        }

        // ============================================================
        // Step planning (first message only)
        // ============================================================
        (Phase::PlanningSteps { image }, Event::StepsPlanned { labels }) => {
            let mut next = state.clone();
            next.steps = steps_from_labels(labels);
            next.phase = Phase::AwaitingReply;
            let request = Effect::RequestReply {
                transcript: next.messages.clone(),
                image: image.clone(),
            };
            let steps = Effect::notify_steps(&next.steps);
            Ok(TransitionResult::new(next)
                .with_effect(steps)
                .with_effect(request))
        }

        // ============================================================
        // Tutor reply
        // ============================================================
        (
            Phase::AwaitingReply,
            Event::TutorReplied {
                text,
                stamp,
                advance_step,
            },
        ) => {
            // History as it was before the user turn that prompted this reply
            let prior_history = state.messages.len().saturating_sub(1);

            let mut next = state.clone();
            let reply = Message::assistant(stamp, text);
            next.messages.push(reply.clone());
            next.phase = Phase::Idle;

            let mut result = TransitionResult::new(next).with_effect(Effect::notify_message(&reply));

            if advance_step
                && prior_history > STEP_ADVANCE_MIN_HISTORY
                && result.new_state.advance_step()
            {
                let steps = Effect::notify_steps(&result.new_state.steps);
                result = result.with_effect(steps);
            }

            Ok(result.with_effect(Effect::notify_loading(false)))
        }

        // The user turn stays; the failure shows up as a fixed assistant turn
        (Phase::AwaitingReply, Event::TutorFailed { stamp, .. }) => {
            let mut next = state.clone();
            let notice = Message::assistant(stamp, REPLY_ERROR_MESSAGE);
            next.messages.push(notice.clone());
            next.phase = Phase::Idle;

            Ok(TransitionResult::new(next)
                .with_effect(Effect::notify_message(&notice))
                .with_effect(Effect::notify_loading(false)))
        }

        // ============================================================
        // Anything else is out of order
        // ============================================================
        (phase, event) => Err(TransitionError::InvalidTransition(format!(
            "{} while {}",
            event.name(),
            phase.name()
        ))),
    }
}
