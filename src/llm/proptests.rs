//! Property-based tests for the Gemini translation layer
//!
//! - Every message becomes exactly one content entry, in order
//! - Roles map to `user` / `model`
//! - Text and inline image payloads survive translation untouched

use super::gemini::GeminiService;
use super::types::{ContentBlock, GenerationConfig, ImageSource, LlmMessage, LlmRequest, MessageRole};
use proptest::prelude::*;

fn arb_text_block() -> impl Strategy<Value = ContentBlock> {
    "[a-zA-Z0-9 _.!?,$^]{0,80}".prop_map(|text| ContentBlock::Text { text })
}

fn arb_image_block() -> impl Strategy<Value = ContentBlock> {
    (
        prop_oneof![
            Just("image/png".to_string()),
            Just("image/jpeg".to_string()),
            Just("image/webp".to_string()),
        ],
        "[a-zA-Z0-9+/]{4,40}",
    )
        .prop_map(|(media_type, data)| ContentBlock::Image {
            source: ImageSource::Base64 { media_type, data },
        })
}

fn arb_message() -> impl Strategy<Value = LlmMessage> {
    (
        prop_oneof![Just(MessageRole::User), Just(MessageRole::Assistant)],
        arb_text_block(),
        proptest::option::of(arb_image_block()),
    )
        .prop_map(|(role, text, image)| {
            let mut content = vec![text];
            content.extend(image);
            LlmMessage { role, content }
        })
}

fn arb_request() -> impl Strategy<Value = LlmRequest> {
    (
        proptest::option::of("[a-zA-Z ]{1,40}"),
        proptest::collection::vec(arb_message(), 1..8),
    )
        .prop_map(|(system, messages)| LlmRequest {
            system,
            messages,
            generation: GenerationConfig::default(),
        })
}

proptest! {
    #[test]
    fn one_content_entry_per_message(request in arb_request()) {
        let body = GeminiService::wire_body(&request);
        let contents = body["contents"].as_array().unwrap();
        prop_assert_eq!(contents.len(), request.messages.len());

        for (msg, content) in request.messages.iter().zip(contents) {
            let expected_role = match msg.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "model",
            };
            prop_assert_eq!(content["role"].as_str(), Some(expected_role));
            prop_assert_eq!(content["parts"].as_array().unwrap().len(), msg.content.len());
        }
    }

    #[test]
    fn payloads_survive_translation(request in arb_request()) {
        let body = GeminiService::wire_body(&request);
        for (msg, content) in request.messages.iter().zip(body["contents"].as_array().unwrap()) {
            for (block, part) in msg.content.iter().zip(content["parts"].as_array().unwrap()) {
                match block {
                    ContentBlock::Text { text } => {
                        prop_assert_eq!(part["text"].as_str(), Some(text.as_str()));
                    }
                    ContentBlock::Image { source: ImageSource::Base64 { media_type, data } } => {
                        prop_assert_eq!(part["inlineData"]["mimeType"].as_str(), Some(media_type.as_str()));
                        prop_assert_eq!(part["inlineData"]["data"].as_str(), Some(data.as_str()));
                    }
                }
            }
        }
    }

    #[test]
    fn system_instruction_is_out_of_band(request in arb_request()) {
        let body = GeminiService::wire_body(&request);
        prop_assert_eq!(body.get("systemInstruction").is_some(), request.system.is_some());
        for content in body["contents"].as_array().unwrap() {
            prop_assert!(content["role"] == "user" || content["role"] == "model");
        }
    }
}
