//! Process-wide audit trail (§4.11): a bounded log of privacy-relevant
//! events, distinct from the per-session detection history in `session.rs`.

use crate::tier::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::RwLock;

const AUDIT_LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    TierEscalated,
    ToolBlocked,
    RedactionApplied,
    MemorySynced,
    ReentrancyShortCircuited,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    Info,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub session_key: String,
    pub kind: AuditKind,
    pub severity: AuditSeverity,
    pub detail: String,
}

/// Bounded ring buffer of audit entries, shared process-wide via `Arc`.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: RwLock<VecDeque<AuditEntry>>,
}

impl AuditLog {
    pub fn new() -> std::sync::Arc<Self> {
        std::sync::Arc::new(Self {
            entries: RwLock::new(VecDeque::new()),
        })
    }

    pub async fn record(
        &self,
        session_key: impl Into<String>,
        kind: AuditKind,
        severity: AuditSeverity,
        detail: impl Into<String>,
    ) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            session_key: session_key.into(),
            kind,
            severity,
            detail: detail.into(),
        };
        let mut entries = self.entries.write().await;
        if entries.len() >= AUDIT_LOG_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub async fn tier_escalated(&self, session_key: &str, from: Tier, to: Tier) {
        self.record(
            session_key,
            AuditKind::TierEscalated,
            AuditSeverity::Info,
            format!("{from} -> {to}"),
        )
        .await;
    }

    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().await.iter().cloned().collect()
    }

    pub async fn entries_for_session(&self, session_key: &str) -> Vec<AuditEntry> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.session_key == session_key)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_and_filters_by_session() {
        let log = AuditLog::new();
        log.record("s1", AuditKind::ToolBlocked, AuditSeverity::Warning, "blocked write")
            .await;
        log.record("s2", AuditKind::RedactionApplied, AuditSeverity::Info, "redacted phone")
            .await;
        assert_eq!(log.len().await, 2);
        assert_eq!(log.entries_for_session("s1").await.len(), 1);
    }

    #[tokio::test]
    async fn ring_buffer_evicts_oldest_beyond_capacity() {
        let log = AuditLog::new();
        for i in 0..60 {
            log.record("s1", AuditKind::MemorySynced, AuditSeverity::Info, format!("sync {i}"))
                .await;
        }
        let entries = log.entries().await;
        assert_eq!(entries.len(), 50);
        assert_eq!(entries[0].detail, "sync 10");
    }

    #[tokio::test]
    async fn tier_escalated_helper_formats_detail() {
        let log = AuditLog::new();
        log.tier_escalated("s1", Tier::S1, Tier::S2).await;
        let entries = log.entries().await;
        assert_eq!(entries[0].kind, AuditKind::TierEscalated);
        assert!(entries[0].detail.contains("S1"));
        assert!(entries[0].detail.contains("S2"));
    }
}
