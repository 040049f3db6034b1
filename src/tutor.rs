//! Tutor Gateway
//!
//! The only component that talks to the generative-language service. Two
//! operations: continue a conversation with a Socratic reply, and plan the
//! learning journey for an opening problem.

mod planner;
mod prompt;

pub use planner::{fallback_plan, parse_plan, FALLBACK_PLAN, MAX_PLAN_STEPS};
pub use prompt::{SYSTEM_INSTRUCTION, TUTOR_NAME};

use crate::attachment::ImageData;
use crate::llm::{
    ContentBlock, GeminiService, GenerationConfig, LlmConfig, LlmError, LlmMessage, LlmRequest,
    LlmService, LoggingService, MessageRole,
};
use crate::state_machine::{Message, Role};
use async_trait::async_trait;
use std::sync::Arc;

/// Returned when the model answers with no text
pub const EMPTY_REPLY_FALLBACK: &str =
    "I'm sorry, I couldn't process that. Let's try rephrasing the problem.";

const REPLY_TEMPERATURE: f32 = 0.7;
const REPLY_TOP_P: f32 = 0.95;
const REPLY_THINKING_BUDGET: u32 = 2000;

#[async_trait]
pub trait TutorGateway: Send + Sync {
    /// Produce the tutor's next turn for `transcript`.
    ///
    /// `image` is attached to the final user turn when that turn does not
    /// already carry it. Errors propagate to the caller.
    async fn continue_conversation(
        &self,
        transcript: &[Message],
        image: Option<&ImageData>,
    ) -> Result<String, LlmError>;

    /// Step labels for a learning journey. Never fails.
    async fn plan_steps(&self, problem: &str) -> Vec<String>;
}

/// Gemini-backed tutor: a reasoning model for replies and a fast model for
/// planning
pub struct Tutor {
    tutor: Arc<dyn LlmService>,
    planner: Arc<dyn LlmService>,
}

impl Tutor {
    pub fn new(tutor: Arc<dyn LlmService>, planner: Arc<dyn LlmService>) -> Self {
        Self { tutor, planner }
    }

    /// Build both services from config, each wrapped for request logging
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let tutor = GeminiService::new(&config.tutor_model, config)?;
        let planner = GeminiService::new(&config.planner_model, config)?;
        tracing::info!(
            tutor = %config.tutor_model,
            planner = %config.planner_model,
            endpoint = %tutor.endpoint(),
            "Tutor gateway configured"
        );
        Ok(Self::new(
            Arc::new(LoggingService::new(Arc::new(tutor))),
            Arc::new(LoggingService::new(Arc::new(planner))),
        ))
    }
}

#[async_trait]
impl TutorGateway for Tutor {
    async fn continue_conversation(
        &self,
        transcript: &[Message],
        image: Option<&ImageData>,
    ) -> Result<String, LlmError> {
        let request = reply_request(transcript, image);
        let response = self.tutor.complete(&request).await?;

        let text = response.text();
        if text.is_empty() {
            tracing::warn!(model = %self.tutor.model_id(), "Tutor returned no text");
            return Ok(EMPTY_REPLY_FALLBACK.to_string());
        }
        Ok(text)
    }

    async fn plan_steps(&self, problem: &str) -> Vec<String> {
        planner::plan_steps(self.planner.as_ref(), problem).await
    }
}

fn reply_request(transcript: &[Message], image: Option<&ImageData>) -> LlmRequest {
    let mut messages: Vec<LlmMessage> = transcript.iter().map(to_llm_message).collect();

    if let Some(image) = image {
        let last_user = messages
            .iter_mut()
            .rev()
            .find(|m| m.role == MessageRole::User);
        if let Some(turn) = last_user {
            let block = image.to_content_block();
            if !turn.content.contains(&block) {
                turn.content.push(block);
            }
        }
    }

    LlmRequest {
        system: Some(SYSTEM_INSTRUCTION.to_string()),
        messages,
        generation: GenerationConfig {
            temperature: Some(REPLY_TEMPERATURE),
            top_p: Some(REPLY_TOP_P),
            thinking_budget: Some(REPLY_THINKING_BUDGET),
            ..GenerationConfig::default()
        },
    }
}

fn to_llm_message(message: &Message) -> LlmMessage {
    let role = match message.role {
        Role::Assistant => MessageRole::Assistant,
        Role::User | Role::System => MessageRole::User,
    };

    let mut content = Vec::with_capacity(2);
    let image = message
        .image_url
        .as_deref()
        .and_then(|uri| match ImageData::from_data_uri(uri) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(message_id = %message.id, error = %e, "Dropping unreadable image");
                None
            }
        });

    // An image-only turn sends just the image
    if image.is_none() || !message.content.trim().is_empty() {
        content.push(ContentBlock::text(message.content.clone()));
    }
    content.extend(image.map(|i| i.to_content_block()));

    LlmMessage { role, content }
}
