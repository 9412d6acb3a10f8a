//! Session State (C6): per-session tier monotone, detection history, and
//! pre-read file registry. Process-local, in-memory, indexed by session key.

use crate::config::PRE_READ_EXTENSIONS;
use crate::context::Checkpoint;
use crate::tier::Tier;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

const DETECTION_HISTORY_CAPACITY: usize = 50;

#[derive(Debug, Clone)]
pub struct DetectionHistoryEntry {
    pub ts: DateTime<Utc>,
    pub tier: Tier,
    pub checkpoint: Checkpoint,
    pub reason: String,
}

/// `{session_key, is_private, highest_tier, detection_history, pre_read_files}`.
#[derive(Debug, Clone)]
pub struct SessionPrivacyState {
    pub session_key: String,
    pub is_private: bool,
    pub highest_tier: Tier,
    pub detection_history: VecDeque<DetectionHistoryEntry>,
    pub pre_read_files: HashSet<String>,
}

impl SessionPrivacyState {
    fn new(session_key: impl Into<String>) -> Self {
        Self {
            session_key: session_key.into(),
            is_private: false,
            highest_tier: Tier::S1,
            detection_history: VecDeque::new(),
            pre_read_files: HashSet::new(),
        }
    }
}

/// The process-wide, per-session registry. Concurrency via a read/write lock,
/// as a single instance shared through `Arc`.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionPrivacyState>>,
}

impl SessionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
        })
    }

    async fn get_or_create<'a>(
        map: &'a mut HashMap<String, SessionPrivacyState>,
        key: &str,
    ) -> &'a mut SessionPrivacyState {
        map.entry(key.to_string())
            .or_insert_with(|| SessionPrivacyState::new(key))
    }

    /// `mark_private(key, tier)`: sets `is_private := is_private ∨ (tier ∈ {S2,S3})`;
    /// updates highest tier via supremum. Both fields are monotone.
    pub async fn mark_private(&self, key: &str, tier: Tier) {
        let mut sessions = self.sessions.write().await;
        let state = Self::get_or_create(&mut sessions, key).await;
        state.is_private = state.is_private || tier.is_private();
        state.highest_tier = Tier::sup([state.highest_tier, tier]);
    }

    pub async fn is_private(&self, key: &str) -> bool {
        self.sessions
            .read()
            .await
            .get(key)
            .map(|s| s.is_private)
            .unwrap_or(false)
    }

    pub async fn highest_tier(&self, key: &str) -> Tier {
        self.sessions
            .read()
            .await
            .get(key)
            .map(|s| s.highest_tier)
            .unwrap_or(Tier::S1)
    }

    /// `record_detection(key, tier, checkpoint, reason)`: append to a ring of
    /// 50 entries, evicting the oldest when full.
    pub async fn record_detection(
        &self,
        key: &str,
        tier: Tier,
        checkpoint: Checkpoint,
        reason: impl Into<String>,
    ) {
        let mut sessions = self.sessions.write().await;
        let state = Self::get_or_create(&mut sessions, key).await;
        if state.detection_history.len() >= DETECTION_HISTORY_CAPACITY {
            state.detection_history.pop_front();
        }
        state.detection_history.push_back(DetectionHistoryEntry {
            ts: Utc::now(),
            tier,
            checkpoint,
            reason: reason.into(),
        });
    }

    /// `mark_pre_read_files(key, message)`: extracts filesystem-path-like
    /// tokens with a recognized extension and adds them to the per-session
    /// set.
    pub async fn mark_pre_read_files(&self, key: &str, message: &str) {
        let paths = extract_path_like_tokens(message);
        if paths.is_empty() {
            return;
        }
        let mut sessions = self.sessions.write().await;
        let state = Self::get_or_create(&mut sessions, key).await;
        for path in paths {
            state.pre_read_files.insert(normalize_path(&path));
        }
    }

    pub async fn add_pre_read_file(&self, key: &str, path: &str) {
        let mut sessions = self.sessions.write().await;
        let state = Self::get_or_create(&mut sessions, key).await;
        state.pre_read_files.insert(normalize_path(path));
    }

    /// `is_file_pre_read(key, path) -> bool`: set-membership with normalized
    /// path comparison.
    pub async fn is_file_pre_read(&self, key: &str, path: &str) -> bool {
        let normalized = normalize_path(path);
        self.sessions
            .read()
            .await
            .get(key)
            .map(|s| s.pre_read_files.contains(&normalized))
            .unwrap_or(false)
    }

    /// `reset(key)`: explicit de-escalation. Also removes the paired guard
    /// session entry (keys derived by appending `:guard`).
    pub async fn reset(&self, key: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(key);
        sessions.remove(&format!("{key}:guard"));
    }

    pub async fn snapshot(&self, key: &str) -> Option<SessionPrivacyState> {
        self.sessions.read().await.get(key).cloned()
    }
}

/// The first path-like token in `message`, if any — used by the orchestrator
/// to decide whether a checkpoint references a file to pre-read (§4.10).
pub fn first_referenced_file(message: &str) -> Option<String> {
    extract_path_like_tokens(message).into_iter().next()
}

fn normalize_path(path: &str) -> String {
    path.trim().trim_start_matches("./").to_string()
}

/// Extracts tokens that look like filesystem paths (contain a `/` or a
/// recognized extension) ending in one of the recognized extensions.
fn extract_path_like_tokens(message: &str) -> Vec<String> {
    message
        .split_whitespace()
        .filter_map(|tok| {
            let trimmed = tok.trim_matches(|c: char| !c.is_alphanumeric() && c != '.' && c != '/' && c != '_' && c != '-');
            let ext = trimmed.rsplit('.').next()?;
            if PRE_READ_EXTENSIONS.contains(&ext.to_lowercase().as_str()) && trimmed.len() > ext.len() + 1 {
                Some(trimmed.to_string())
            } else {
                None
            }
        })
        .collect()
}
