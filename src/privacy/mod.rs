//! Desensitization pipeline: privacy entities (C4's output shape), the PII
//! extractor (C4), and the redactor (C5).

pub mod entity;
pub mod extractor;
pub mod redactor;

pub use entity::PrivacyEntity;
pub use redactor::{redact, redact_fallback, redact_with_fallback, RedactionOutcome};
