//! File-Access Guard (C9): rejects tool calls that would let a remote-model
//! context read protected paths or pre-read files.

use crate::config::{Config, PATH_PARAM_KEYS};
use crate::context::is_guard_session_key;
use crate::session::SessionRegistry;
use crate::tier::Tier;
use serde_json::Value;

const PRE_READ_TOOLS: &[&str] = &["read", "read_file", "cat"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Block(String),
}

/// `guard_tool_call(checkpoint, tool_name, params, session_key, config) -> Allow | Block(reason)`.
///
/// `tier` is the aggregator's tier for this call, already computed by the
/// orchestrator — the guard does not run detection itself (§4.9 rule 3).
pub async fn guard_tool_call(
    tool_name: &str,
    params: &Value,
    session_key: &str,
    config: &Config,
    sessions: &SessionRegistry,
    tier: Tier,
) -> GuardDecision {
    let is_guard_session = is_guard_session_key(session_key);

    // Rule 1: protected-root paths are blocked for any non-guard session.
    if !is_guard_session {
        let mut paths = Vec::new();
        collect_paths(params, &mut paths);
        let roots = config.protected_roots();
        for path in &paths {
            if roots.iter().any(|root| path_under_root(root, path)) || config.is_full_track_path(path)
            {
                return GuardDecision::Block(format!(
                    "path '{path}' is under a protected root and cannot be accessed from this session"
                ));
            }
        }
    }

    // Rule 2: previously pre-read files are blocked for read-style tools —
    // the content was already supplied desensitized inline.
    if PRE_READ_TOOLS.contains(&tool_name) {
        if let Some(path) = extract_single_path(params) {
            if sessions.is_file_pre_read(session_key, &path).await {
                return GuardDecision::Block(format!(
                    "'{path}' was already supplied desensitized in the prompt; re-reading it via tools is not permitted"
                ));
            }
        }
    }

    // Rule 3: defer to the aggregator's tier for the call.
    match tier {
        Tier::S3 => GuardDecision::Block(format!("blocked: call classified as S3 ({tool_name})")),
        Tier::S2 => {
            sessions.mark_private(session_key, Tier::S2).await;
            GuardDecision::Allow
        }
        Tier::S1 => GuardDecision::Allow,
    }
}

fn path_under_root(root: &str, candidate: &str) -> bool {
    if candidate == root {
        return true;
    }
    candidate.starts_with(&format!("{root}/"))
}

fn collect_paths(value: &Value, out: &mut Vec<String>) {
    if let Value::Object(map) = value {
        for (key, v) in map {
            if PATH_PARAM_KEYS.contains(&key.as_str()) {
                if let Value::String(s) = v {
                    out.push(s.clone());
                }
            }
            if v.is_object() {
                collect_paths(v, out);
            }
        }
    }
}

fn extract_single_path(params: &Value) -> Option<String> {
    let map = params.as_object()?;
    for key in PATH_PARAM_KEYS {
        if let Some(Value::String(s)) = map.get(*key) {
            return Some(s.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn config_with_base(base: &str) -> Config {
        let mut cfg = Config::default();
        cfg.session.base_dir = base.to_string();
        cfg
    }

    #[tokio::test]
    async fn blocks_path_under_protected_root() {
        let cfg = config_with_base("/home/u/.a3s");
        let sessions = SessionRegistry::new();
        let decision = guard_tool_call(
            "read",
            &serde_json::json!({"path": "/home/u/.a3s/agents/a1/sessions/full/s1.jsonl"}),
            "session-1",
            &cfg,
            &sessions,
            Tier::S1,
        )
        .await;
        assert!(matches!(decision, GuardDecision::Block(_)));
    }

    #[tokio::test]
    async fn guard_session_bypasses_protected_root_block() {
        let cfg = config_with_base("/home/u/.a3s");
        let sessions = SessionRegistry::new();
        let decision = guard_tool_call(
            "read",
            &serde_json::json!({"path": "/home/u/.a3s/agents/a1/sessions/full/s1.jsonl"}),
            "session-1:guard:inner",
            &cfg,
            &sessions,
            Tier::S1,
        )
        .await;
        assert_eq!(decision, GuardDecision::Allow);
    }

    #[tokio::test]
    async fn blocks_read_of_pre_read_file() {
        let cfg = Config::default();
        let sessions = SessionRegistry::new();
        sessions.add_pre_read_file("session-1", "invoices/Q3.csv").await;
        let decision = guard_tool_call(
            "read",
            &serde_json::json!({"path": "invoices/Q3.csv"}),
            "session-1",
            &cfg,
            &sessions,
            Tier::S1,
        )
        .await;
        assert!(matches!(decision, GuardDecision::Block(_)));
    }

    #[tokio::test]
    async fn s3_call_is_blocked() {
        let cfg = Config::default();
        let sessions = SessionRegistry::new();
        let decision = guard_tool_call(
            "system.run",
            &serde_json::json!({"path": "/etc/shadow"}),
            "session-1",
            &cfg,
            &sessions,
            Tier::S3,
        )
        .await;
        match decision {
            GuardDecision::Block(reason) => assert!(reason.contains("S3")),
            _ => panic!("expected block"),
        }
    }

    #[tokio::test]
    async fn s2_call_is_allowed_but_marks_session_private() {
        let cfg = Config::default();
        let sessions = SessionRegistry::new();
        let decision = guard_tool_call(
            "write",
            &serde_json::json!({"path": "notes.txt"}),
            "session-1",
            &cfg,
            &sessions,
            Tier::S2,
        )
        .await;
        assert_eq!(decision, GuardDecision::Allow);
        assert!(sessions.is_private("session-1").await);
    }

    #[tokio::test]
    async fn s1_call_is_allowed_and_session_stays_unmarked() {
        let cfg = Config::default();
        let sessions = SessionRegistry::new();
        let decision = guard_tool_call(
            "write",
            &serde_json::json!({"path": "notes.txt"}),
            "session-1",
            &cfg,
            &sessions,
            Tier::S1,
        )
        .await;
        assert_eq!(decision, GuardDecision::Allow);
        assert!(!sessions.is_private("session-1").await);
    }

    #[tokio::test]
    async fn clean_track_reads_are_not_blocked_as_protected() {
        let cfg = config_with_base("/home/u/.a3s");
        let sessions = SessionRegistry::new();
        let decision = guard_tool_call(
            "read",
            &serde_json::json!({"path": "/home/u/.a3s/agents/a1/sessions/clean/s1.jsonl"}),
            "session-1",
            &cfg,
            &sessions,
            Tier::S1,
        )
        .await;
        assert_eq!(decision, GuardDecision::Allow);
    }

    #[tokio::test]
    async fn protected_root_exact_match_boundary_case() {
        let cfg = config_with_base("/home/u/.a3s");
        let sessions = SessionRegistry::new();
        let decision = guard_tool_call(
            "read",
            &serde_json::json!({"path": "/home/u/.a3s/MEMORY-FULL.md"}),
            "session-1",
            &cfg,
            &sessions,
            Tier::S1,
        )
        .await;
        assert!(matches!(decision, GuardDecision::Block(_)));
    }
}
