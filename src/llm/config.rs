//! LLM configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TUTOR_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_PLANNER_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Configuration for the Gemini-backed tutor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// Credential; `None` leaves the service unconfigured and every call fails
    pub api_key: Option<String>,
    pub base_url: String,
    /// Gateway URL (e.g., `http://169.254.169.254/gateway/llm`); the gateway
    /// authenticates on our behalf, so no key is sent
    pub gateway: Option<String>,
    pub tutor_model: String,
    pub planner_model: String,
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gateway: None,
            tutor_model: DEFAULT_TUTOR_MODEL.to_string(),
            planner_model: DEFAULT_PLANNER_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl LlmConfig {
    /// Build config from the process environment.
    ///
    /// - `GEMINI_API_KEY` (or `API_KEY`): credential
    /// - `GEMINI_BASE_URL`: default public Gemini endpoint
    /// - `LLM_GATEWAY`: route through a gateway instead of sending the key
    /// - `SOCRATIS_TUTOR_MODEL`, `SOCRATIS_PLANNER_MODEL`
    /// - `SOCRATIS_REQUEST_TIMEOUT_SECS`: default 300
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let request_timeout = non_empty("SOCRATIS_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(defaults.request_timeout, Duration::from_secs);

        Self {
            api_key: non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")),
            base_url: non_empty("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            gateway: non_empty("LLM_GATEWAY"),
            tutor_model: non_empty("SOCRATIS_TUTOR_MODEL").unwrap_or(defaults.tutor_model),
            planner_model: non_empty("SOCRATIS_PLANNER_MODEL").unwrap_or(defaults.planner_model),
            request_timeout,
        }
    }

    /// Whether calls can be authenticated at all
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some() || self.gateway.is_some()
    }
}
