//! PII Extractor (C4): locally extracts `(type, value)` spans from content via
//! a local-model completion-style prompt.

use crate::llm::{CallOptions, LocalModelClient};
use crate::privacy::entity::PrivacyEntity;
use std::time::Duration;

const MAX_SNIPPET_LEN: usize = 3000;

const EXTRACTION_PROMPT: &str = r#"Extract privacy-sensitive entities from the text below as a JSON array of objects with "type" and "value" fields. Only include names, phone numbers, addresses, emails, access codes, IDs, card numbers, and similar sensitive spans. Do not include anything not present verbatim in the text.

Input: "Contact Jane Doe at jane@acme.test or 555-0100."
Output: [{"type":"name","value":"Jane Doe"},{"type":"email","value":"jane@acme.test"},{"type":"phone","value":"555-0100"}]

Input: ""#;

/// `extract_pii(content) -> list[(type, value)]`.
pub async fn extract_pii(content: &str, client: &LocalModelClient) -> Vec<PrivacyEntity> {
    if content.is_empty() {
        return Vec::new();
    }
    let snippet: String = content.chars().take(MAX_SNIPPET_LEN).collect();
    let prompt = format!("{EXTRACTION_PROMPT}{snippet}\"\nOutput: [");

    let opts = CallOptions {
        temperature: 0.0,
        num_predict: Some(512),
        stop: vec!["\n\n".to_string(), "Input:".to_string(), "Task:".to_string()],
        timeout: Duration::from_secs(10),
    };

    let Some(reply) = client.generate(&prompt, &opts).await else {
        return Vec::new();
    };

    parse_extraction_reply(&reply)
}

/// The model reply is prefixed with `[`, trimmed after the last `]`, and
/// parsed as JSON. Non-array or invalid JSON yields an empty list. Entities
/// are filtered to those where both fields are strings and `value.len() >= 2`.
fn parse_extraction_reply(reply: &str) -> Vec<PrivacyEntity> {
    let mut candidate = format!("[{}", reply.trim_start_matches('['));
    if let Some(end) = candidate.rfind(']') {
        candidate.truncate(end + 1);
    } else {
        return Vec::new();
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(&candidate) else {
        return Vec::new();
    };
    let Some(array) = value.as_array() else {
        return Vec::new();
    };

    array
        .iter()
        .filter_map(|item| {
            let entity_type = item.get("type")?.as_str()?.to_string();
            let val = item.get("value")?.as_str()?.to_string();
            if val.chars().count() >= 2 {
                Some(PrivacyEntity {
                    entity_type,
                    value: val,
                })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_array() {
        let reply = r#"{"type":"email","value":"jane@acme.test"},{"type":"name","value":"Jane Doe"}]"#;
        let entities = parse_extraction_reply(reply);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].entity_type, "email");
    }

    #[test]
    fn filters_out_single_char_values() {
        let reply = r#"[{"type":"x","value":"a"},{"type":"email","value":"jane@acme.test"}]"#;
        let entities = parse_extraction_reply(reply);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].entity_type, "email");
    }

    #[test]
    fn invalid_json_yields_empty_list() {
        let reply = "not json at all";
        assert!(parse_extraction_reply(reply).is_empty());
    }

    #[test]
    fn trims_trailing_hallucination_after_last_bracket() {
        let reply = r#"[{"type":"name","value":"Jane Doe"}] and then the model kept talking"#;
        let entities = parse_extraction_reply(reply);
        assert_eq!(entities.len(), 1);
    }

    #[tokio::test]
    async fn empty_content_short_circuits_without_calling_model() {
        let client = LocalModelClient::new("http://127.0.0.1:1", "test-model");
        let entities = extract_pii("", &client).await;
        assert!(entities.is_empty());
    }
}
