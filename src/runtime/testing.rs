//! Mock implementations for testing
//!
//! These mocks enable runtime and gateway tests without network I/O.

use super::traits::*;
use crate::attachment::ImageData;
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use crate::state_machine::Message;
use crate::tutor::{fallback_plan, TutorGateway};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

#[allow(dead_code)]
impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Tutor Gateway
// ============================================================================

/// Recorded `continue_conversation` arguments
pub type ReplyCall = (Vec<Message>, Option<ImageData>);

/// Gateway with queued plans and replies.
///
/// An empty plan queue answers with the fallback plan, like a planner whose
/// call failed. An empty reply queue answers with a network error.
#[derive(Default)]
pub struct MockTutorGateway {
    plans: Mutex<VecDeque<Vec<String>>>,
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    plan_calls: Mutex<Vec<String>>,
    reply_calls: Mutex<Vec<ReplyCall>>,
}

#[allow(dead_code)]
impl MockTutorGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_plan<I, S>(&self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plans
            .lock()
            .unwrap()
            .push_back(labels.into_iter().map(Into::into).collect());
    }

    pub fn queue_reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn queue_error(&self, error: LlmError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn plan_calls(&self) -> Vec<String> {
        self.plan_calls.lock().unwrap().clone()
    }

    pub fn reply_calls(&self) -> Vec<ReplyCall> {
        self.reply_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TutorGateway for MockTutorGateway {
    async fn continue_conversation(
        &self,
        transcript: &[Message],
        image: Option<&ImageData>,
    ) -> Result<String, LlmError> {
        self.reply_calls
            .lock()
            .unwrap()
            .push((transcript.to_vec(), image.cloned()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock reply queued")))
    }

    async fn plan_steps(&self, problem: &str) -> Vec<String> {
        self.plan_calls.lock().unwrap().push(problem.to_string());
        self.plans
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(fallback_plan)
    }
}

// ============================================================================
// Gated Tutor Gateway (for busy-session testing)
// ============================================================================

/// Gateway whose replies block until released
pub struct GatedTutorGateway {
    pub inner: MockTutorGateway,
    /// Notified when a reply call starts
    pub started: Arc<Notify>,
    /// Notify to let the pending reply through
    pub release: Arc<Notify>,
}

impl GatedTutorGateway {
    pub fn new() -> Self {
        Self {
            inner: MockTutorGateway::new(),
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl TutorGateway for GatedTutorGateway {
    async fn continue_conversation(
        &self,
        transcript: &[Message],
        image: Option<&ImageData>,
    ) -> Result<String, LlmError> {
        self.started.notify_one();
        self.release.notified().await;
        self.inner.continue_conversation(transcript, image).await
    }

    async fn plan_steps(&self, problem: &str) -> Vec<String> {
        self.inner.plan_steps(problem).await
    }
}

// ============================================================================
// Fixed progression
// ============================================================================

/// Progression that always answers the same
#[derive(Debug, Clone, Copy)]
pub struct FixedProgression(pub bool);

impl StepProgression for FixedProgression {
    fn should_advance(&self) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_llm_service() {
        let mock = MockLlmService::new("test-model");
        mock.queue_response(LlmResponse::from_text("Hello"));

        let request = LlmRequest::default();
        let response = mock.complete(&request).await.unwrap();
        assert_eq!(response.text(), "Hello");

        // Second call should fail (no more responses)
        assert!(mock.complete(&request).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_gateway_defaults() {
        let gateway = MockTutorGateway::new();
        assert_eq!(gateway.plan_steps("x").await, fallback_plan());
        assert!(gateway.continue_conversation(&[], None).await.is_err());
        assert_eq!(gateway.plan_calls(), vec!["x"]);
        assert_eq!(gateway.reply_calls().len(), 1);
    }
}
