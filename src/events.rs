//! Observability event emitted to the host's generic plugin event bus
//! (§4.10, §6). This crate never fans events out itself — a host
//! integration implements `EventSink` to bridge into its own bus.

use crate::tier::Tier;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Emitted on every tier-raising outcome, i.e. whenever a session's
/// `highest_tier` increases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacyActivatedEvent {
    pub tier: Tier,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub reason: String,
    pub session_key: String,
}

/// The host's generic plugin event bus, as seen from this crate.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: PrivacyActivatedEvent);
}

/// Emits to `tracing` only; the default when no host sink is wired up.
#[derive(Debug, Default)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: PrivacyActivatedEvent) {
        tracing::warn!(
            tier = %event.tier,
            session_key = %event.session_key,
            reason = %event.reason,
            provider = ?event.provider,
            model = ?event.model,
            "privacy_activated"
        );
    }
}
