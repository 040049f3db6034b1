//! Trait abstractions for runtime collaborators
//!
//! These traits enable testing the executor with deterministic stand-ins.

use crate::attachment::ImageData;
use crate::llm::LlmError;
use crate::state_machine::Message;
use crate::tutor::TutorGateway;
use async_trait::async_trait;
use std::sync::Arc;

/// Decides whether a reply moves the learning journey forward.
///
/// Placeholder progression: nothing here inspects the conversation.
pub trait StepProgression: Send + Sync {
    fn should_advance(&self) -> bool;
}

/// Advances with fixed probability per reply
#[derive(Debug, Clone, Copy)]
pub struct RandomProgression {
    probability: f64,
}

impl RandomProgression {
    pub const DEFAULT_PROBABILITY: f64 = 0.4;

    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

impl Default for RandomProgression {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROBABILITY)
    }
}

impl StepProgression for RandomProgression {
    fn should_advance(&self) -> bool {
        rand::random::<f64>() < self.probability
    }
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: TutorGateway + ?Sized> TutorGateway for Arc<T> {
    async fn continue_conversation(
        &self,
        transcript: &[Message],
        image: Option<&ImageData>,
    ) -> Result<String, LlmError> {
        (**self).continue_conversation(transcript, image).await
    }

    async fn plan_steps(&self, problem: &str) -> Vec<String> {
        (**self).plan_steps(problem).await
    }
}

impl<T: StepProgression + ?Sized> StepProgression for Arc<T> {
    fn should_advance(&self) -> bool {
        (**self).should_advance()
    }
}
