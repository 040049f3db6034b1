//! Learning-journey planning using the fast model
//!
//! Turns the opening problem into a short list of step labels. Planning
//! never fails from the caller's point of view: anything that goes wrong
//! yields [`FALLBACK_PLAN`].

use crate::llm::{GenerationConfig, LlmMessage, LlmRequest, LlmService};

const PLANNING_PROMPT: &str = "Break this problem down into 4-6 high-level logical steps for a learning journey. Return ONLY a JSON array of strings. Problem:";

pub const FALLBACK_PLAN: [&str; 4] = ["Identify Problem", "Analysis", "Calculation", "Verification"];

pub const MAX_PLAN_STEPS: usize = 6;

pub fn fallback_plan() -> Vec<String> {
    FALLBACK_PLAN.iter().map(ToString::to_string).collect()
}

pub(super) fn planning_request(problem: &str) -> LlmRequest {
    LlmRequest {
        system: None,
        messages: vec![LlmMessage::user_text(format!("{PLANNING_PROMPT} {problem}"))],
        generation: GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            ..GenerationConfig::default()
        },
    }
}

/// Ask the planner model for step labels
pub async fn plan_steps(llm: &dyn LlmService, problem: &str) -> Vec<String> {
    let response = match llm.complete(&planning_request(problem)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, kind = ?e.kind, "Step planning failed, using fallback plan");
            return fallback_plan();
        }
    };

    let raw = response.text();
    match parse_plan(&raw) {
        Some(labels) => labels,
        None => {
            tracing::warn!(response = %raw, "Unusable step plan, using fallback plan");
            fallback_plan()
        }
    }
}

/// Parse a JSON array of labels.
///
/// Tolerates a surrounding markdown code fence, skips blank and non-string
/// entries, and keeps at most [`MAX_PLAN_STEPS`]. `None` when nothing usable
/// remains.
pub fn parse_plan(raw: &str) -> Option<Vec<String>> {
    let body = strip_code_fence(raw.trim());
    let values: Vec<serde_json::Value> = serde_json::from_str(body).ok()?;

    let labels: Vec<String> = values
        .iter()
        .filter_map(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .take(MAX_PLAN_STEPS)
        .map(ToString::to_string)
        .collect();

    if labels.is_empty() {
        None
    } else {
        Some(labels)
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. "json") on the opening fence line
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ContentBlock, LlmError, LlmResponse};
    use crate::runtime::testing::MockLlmService;

    #[test]
    fn parses_plain_array() {
        let labels = parse_plan(r#"["Understand the equation", "Isolate x", "Check"]"#).unwrap();
        assert_eq!(labels, vec!["Understand the equation", "Isolate x", "Check"]);
    }

    #[test]
    fn parses_fenced_array() {
        let raw = "```json\n[\"Read the source\", \"Find the context\"]\n```";
        assert_eq!(
            parse_plan(raw).unwrap(),
            vec!["Read the source", "Find the context"]
        );
    }

    #[test]
    fn drops_blank_and_non_string_entries() {
        let labels = parse_plan(r#"["  ", "Analysis", 3, null, " Verify "]"#).unwrap();
        assert_eq!(labels, vec!["Analysis", "Verify"]);
    }

    #[test]
    fn truncates_long_plans() {
        let raw = serde_json::to_string(&(1..=9).map(|i| format!("Step {i}")).collect::<Vec<_>>()).unwrap();
        let labels = parse_plan(&raw).unwrap();
        assert_eq!(labels.len(), MAX_PLAN_STEPS);
        assert_eq!(labels[5], "Step 6");
    }

    #[test]
    fn rejects_unusable_output() {
        assert_eq!(parse_plan("[]"), None);
        assert_eq!(parse_plan("Here are your steps: 1. Think"), None);
        assert_eq!(parse_plan(r#"{"steps": ["A"]}"#), None);
        assert_eq!(parse_plan(""), None);
    }

    #[test]
    fn request_asks_for_json() {
        let request = planning_request("Explain the Magna Carta");
        assert_eq!(
            request.generation.response_mime_type.as_deref(),
            Some("application/json")
        );
        assert!(request.system.is_none());
        assert!(matches!(
            &request.messages[0].content[0],
            ContentBlock::Text { text } if text.ends_with("Problem: Explain the Magna Carta")
        ));
    }

    #[tokio::test]
    async fn uses_model_plan() {
        let llm = MockLlmService::new("planner");
        llm.queue_response(LlmResponse::from_text(r#"["Identify forces", "Apply Newton", "Compute"]"#));

        let labels = plan_steps(&llm, "Calculate the force of gravity between two objects").await;
        assert_eq!(labels, vec!["Identify forces", "Apply Newton", "Compute"]);
        assert_eq!(llm.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn falls_back_on_error_or_garbage() {
        let llm = MockLlmService::new("planner");
        llm.queue_error(LlmError::network("Connection failed: refused"));
        assert_eq!(plan_steps(&llm, "anything").await, fallback_plan());

        llm.queue_response(LlmResponse::from_text("not json at all"));
        assert_eq!(plan_steps(&llm, "anything").await, fallback_plan());

        llm.queue_response(LlmResponse::from_text("[]"));
        assert_eq!(plan_steps(&llm, "anything").await, fallback_plan());
    }
}
