//! Redactor (C5): replaces extracted spans with typed opaque tokens, with a
//! rule-only fallback when the local model is unavailable.

use crate::privacy::entity::{redaction_token, PrivacyEntity};
use regex::Regex;
use std::sync::OnceLock;

/// Result of a redaction pass. `model_used` distinguishes semantic redaction
/// (entities came from the model-backed extractor) from the rule-based
/// fallback, so observers can tell which path ran.
#[derive(Debug, Clone)]
pub struct RedactionOutcome {
    pub content: String,
    pub model_used: bool,
}

/// `redact(content, entities) -> redacted_content`.
///
/// Entities are sorted by `value` length descending before replacement so a
/// longer entity is never partially shadowed by a shorter one that is one of
/// its substrings. After replacement, the post-condition (no entity value
/// remains a substring of the output) is verified; if violated, the failing
/// value is reapplied first.
pub fn redact(content: &str, entities: &[PrivacyEntity]) -> String {
    let mut sorted: Vec<&PrivacyEntity> = entities.iter().collect();
    sorted.sort_by(|a, b| b.value.chars().count().cmp(&a.value.chars().count()));

    let mut out = content.to_string();
    for entity in &sorted {
        out = replace_literal(&out, &entity.value, &redaction_token(&entity.entity_type));
    }

    // Correctness requirement: verify the post-condition and reapply the
    // failing value first if violated.
    for entity in &sorted {
        if out.contains(entity.value.as_str()) {
            out = replace_literal(&out, &entity.value, &redaction_token(&entity.entity_type));
        }
    }

    out
}

fn replace_literal(haystack: &str, needle: &str, token: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }
    haystack.replace(needle, token)
}

/// Fallback redactor applied when the local model is disabled or its
/// extraction call fails: a small ordered list of regex substitutions.
pub fn redact_fallback(content: &str) -> String {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        vec![
            (Regex::new(r"sk-[A-Za-z0-9]{16,}").unwrap(), "[REDACTED:SECRET]"),
            (Regex::new(r"(?i)token=\S+").unwrap(), "[REDACTED:SECRET]"),
            (Regex::new(r"(?i)password\s*[:=]\s*\S+").unwrap(), "[REDACTED:SECRET]"),
        ]
    });

    let mut out = content.to_string();
    for (re, token) in patterns {
        out = re.replace_all(&out, *token).to_string();
    }
    out
}

/// Run the full redaction pipeline: prefer entities if present, else fall
/// back to the rule-based redactor. `model_available` reflects whether the
/// model-backed extraction path was usable at all (disabled, or its call
/// failed upstream).
pub fn redact_with_fallback(
    content: &str,
    entities: &[PrivacyEntity],
    model_available: bool,
) -> RedactionOutcome {
    if model_available {
        RedactionOutcome {
            content: redact(content, entities),
            model_used: true,
        }
    } else {
        RedactionOutcome {
            content: redact_fallback(content),
            model_used: false,
        }
    }
}
