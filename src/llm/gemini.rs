//! Google Gemini provider implementation

use super::config::LlmConfig;
use super::types::{
    ContentBlock, GenerationConfig, ImageSource, LlmRequest, LlmResponse, MessageRole, Usage,
};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Gemini service implementation bound to one model
pub struct GeminiService {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    gateway_mode: bool,
    model_id: String,
}

impl GeminiService {
    pub fn new(model: &str, config: &LlmConfig) -> Result<Self, LlmError> {
        let endpoint = match config.gateway.as_deref() {
            // Gateway format mirrors the public path under a `/gemini` prefix
            Some(gw) => format!(
                "{}/gemini/v1beta/models/{model}:generateContent",
                gw.trim_end_matches('/')
            ),
            None => format!(
                "{}/models/{model}:generateContent",
                config.base_url.trim_end_matches('/')
            ),
        };

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint,
            gateway_mode: config.gateway.is_some(),
            model_id: model.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn translate_request(request: &LlmRequest) -> GeminiRequest {
        let system_instruction = request.system.as_ref().map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart::Text { text: text.clone() }],
        });

        let contents = request
            .messages
            .iter()
            .map(|msg| {
                let role = match msg.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "model",
                };
                let parts = msg
                    .content
                    .iter()
                    .map(|block| match block {
                        ContentBlock::Text { text } => GeminiPart::Text { text: text.clone() },
                        ContentBlock::Image {
                            source: ImageSource::Base64 { media_type, data },
                        } => GeminiPart::InlineData {
                            inline_data: GeminiBlob {
                                mime_type: media_type.clone(),
                                data: data.clone(),
                            },
                        },
                    })
                    .collect();
                GeminiContent {
                    role: Some(role.to_string()),
                    parts,
                }
            })
            .collect();

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: Self::translate_generation(&request.generation),
        }
    }

    /// Wire body for a request, as sent to the provider
    #[cfg(test)]
    pub(super) fn wire_body(request: &LlmRequest) -> serde_json::Value {
        serde_json::to_value(Self::translate_request(request)).unwrap_or_default()
    }

    fn translate_generation(generation: &GenerationConfig) -> Option<GeminiGenerationConfig> {
        if *generation == GenerationConfig::default() {
            return None;
        }
        Some(GeminiGenerationConfig {
            temperature: generation.temperature,
            top_p: generation.top_p,
            response_mime_type: generation.response_mime_type.clone(),
            thinking_config: generation
                .thinking_budget
                .map(|thinking_budget| GeminiThinkingConfig { thinking_budget }),
        })
    }

    /// Normalize a Gemini response.
    ///
    /// A response without candidates (e.g. a blocked prompt) is an empty
    /// reply, not an error; callers decide what an empty reply means.
    fn normalize_response(resp: GeminiResponse) -> LlmResponse {
        let usage = resp.usage_metadata.map_or_else(Usage::default, |u| Usage {
            input_tokens: u64::from(u.prompt_token_count),
            output_tokens: u64::from(u.candidates_token_count),
            thinking_tokens: u64::from(u.thoughts_token_count),
        });

        let Some(candidate) = resp.candidates.into_iter().next() else {
            return LlmResponse {
                content: vec![],
                usage,
            };
        };

        // Thought summaries are internal reasoning, never part of the reply
        let content = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text)
            .filter(|text| !text.is_empty())
            .map(|text| ContentBlock::Text { text })
            .collect();

        LlmResponse { content, usage }
    }
}

#[async_trait]
impl LlmService for GeminiService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut builder = self.client.post(&self.endpoint);
        if !self.gateway_mode {
            let Some(api_key) = self.api_key.as_deref() else {
                return Err(LlmError::auth(
                    "No API key configured (set GEMINI_API_KEY or API_KEY)",
                ));
            };
            builder = builder.header("x-goog-api-key", api_key);
        }

        let response = builder
            .json(&Self::translate_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiErrorResponse>(&body)
                .map_or(body, |resp| resp.error.message);
            return Err(LlmError::from_status(status, &message));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Ok(Self::normalize_response(gemini_response))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiBlob,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<GeminiThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

/// Response parts are read leniently: anything that is not text is dropped
#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    thoughts_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
