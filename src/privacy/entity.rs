//! Privacy entity type and the normalization table to a closed redaction-token
//! set.

use serde::{Deserialize, Serialize};

/// `{type, value}` as returned by the extractor. `type` is open-ended until
/// normalized by `canonical_type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrivacyEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub value: String,
}

/// The closed set of redaction-token types a recognized entity type maps to.
const CANONICAL_TYPES: &[(&str, &str)] = &[
    ("name", "NAME"),
    ("full_name", "NAME"),
    ("phone", "PHONE"),
    ("phone_number", "PHONE"),
    ("mobile", "PHONE"),
    ("email", "EMAIL"),
    ("email_address", "EMAIL"),
    ("address", "ADDRESS"),
    ("home_address", "ADDRESS"),
    ("access_code", "ACCESS_CODE"),
    ("code", "ACCESS_CODE"),
    ("verification_code", "ACCESS_CODE"),
    ("delivery", "DELIVERY"),
    ("delivery_address", "DELIVERY"),
    ("id", "ID"),
    ("id_number", "ID"),
    ("identity_card", "ID"),
    ("card", "CARD"),
    ("card_number", "CARD"),
    ("credit_card", "CARD"),
    ("secret", "SECRET"),
    ("api_key", "SECRET"),
    ("password", "SECRET"),
    ("token", "SECRET"),
    ("ip", "IP"),
    ("ip_address", "IP"),
    ("license", "LICENSE"),
    ("license_plate", "LICENSE"),
    ("time", "TIME"),
    ("date", "DATE"),
    ("salary", "SALARY"),
    ("amount", "AMOUNT"),
    ("payment", "PAYMENT"),
    ("birthday", "BIRTHDAY"),
    ("date_of_birth", "BIRTHDAY"),
];

/// Normalizes `entity_type` (case-insensitive, spaces to underscores) to a
/// canonical redaction-token type. Unknown types pass through uppercased.
pub fn canonical_type(entity_type: &str) -> String {
    let normalized = entity_type.trim().to_lowercase().replace(' ', "_");
    CANONICAL_TYPES
        .iter()
        .find(|(k, _)| *k == normalized)
        .map(|(_, v)| v.to_string())
        .unwrap_or_else(|| normalized.to_uppercase())
}

/// `[REDACTED:<CANONICAL>]`
pub fn redaction_token(entity_type: &str) -> String {
    format!("[REDACTED:{}]", canonical_type(entity_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_aliases_map_to_canonical_type() {
        assert_eq!(canonical_type("Phone Number"), "PHONE");
        assert_eq!(canonical_type("credit_card"), "CARD");
        assert_eq!(canonical_type("API_KEY"), "SECRET");
    }

    #[test]
    fn unknown_type_passes_through_uppercased() {
        assert_eq!(canonical_type("passport"), "PASSPORT");
    }

    #[test]
    fn redaction_token_format() {
        assert_eq!(redaction_token("email"), "[REDACTED:EMAIL]");
    }
}
