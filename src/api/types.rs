//! API request and response types

use crate::view::SessionView;
use serde::{Deserialize, Serialize};

/// Request to send a message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub text: String,
    /// Data URI (`data:image/png;base64,...`)
    #[serde(default)]
    pub image: Option<String>,
}

/// Request to pick a topic
#[derive(Debug, Deserialize)]
pub struct SelectTopicRequest {
    pub label: String,
}

/// Response for an accepted message
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub queued: bool,
}

/// Topic and suggestion lists
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub topics: Vec<&'static str>,
    pub suggestions: Vec<CatalogSuggestion>,
}

#[derive(Debug, Serialize)]
pub struct CatalogSuggestion {
    pub label: &'static str,
    pub text: String,
}

/// Rendered view model
#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub view: SessionView,
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
