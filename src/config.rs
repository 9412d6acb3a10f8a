//! Configuration surface (§6). Loaded from YAML or JSON via `serde`; unknown
//! top-level keys are rejected at load time rather than silently ignored.

use crate::context::Checkpoint;
use crate::error::{PrivacyError, Result};
use crate::tier::DetectorKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolPathRules {
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierKeywordsPatterns {
    #[serde(default, rename = "S2")]
    pub s2: Vec<String>,
    #[serde(default, rename = "S3")]
    pub s3: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierToolRules {
    #[serde(default, rename = "S2")]
    pub s2: ToolPathRules,
    #[serde(default, rename = "S3")]
    pub s3: ToolPathRules,
}

impl Default for ToolPathRules {
    fn default() -> Self {
        Self {
            tools: Vec::new(),
            paths: Vec::new(),
        }
    }
}

impl Default for TierKeywordsPatterns {
    fn default() -> Self {
        Self {
            s2: Vec::new(),
            s3: Vec::new(),
        }
    }
}

impl Default for TierToolRules {
    fn default() -> Self {
        Self {
            s2: ToolPathRules::default(),
            s3: ToolPathRules::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RuleConfig {
    #[serde(default = "default_keywords")]
    pub keywords: TierKeywordsPatterns,
    #[serde(default = "default_patterns")]
    pub patterns: TierKeywordsPatterns,
    #[serde(default)]
    pub tools: TierToolRules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct LocalModelConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct GuardAgentConfig {
    #[serde(default = "default_guard_id")]
    pub id: String,
    #[serde(default = "default_guard_workspace")]
    pub workspace: String,
    #[serde(default = "default_model")]
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default = "default_true")]
    pub isolate_guard_history: bool,
    #[serde(default = "default_base_dir")]
    pub base_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CheckpointDetectors {
    #[serde(default = "default_checkpoint_detectors")]
    pub on_user_message: Vec<String>,
    #[serde(default = "default_checkpoint_detectors")]
    pub on_tool_call_proposed: Vec<String>,
    #[serde(default = "default_checkpoint_detectors")]
    pub on_tool_call_executed: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub checkpoints: CheckpointDetectors,
    #[serde(default)]
    pub rules: RuleConfig,
    #[serde(default)]
    pub local_model: LocalModelConfig,
    #[serde(default)]
    pub guard_agent: GuardAgentConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

fn default_true() -> bool {
    true
}
fn default_provider() -> String {
    "ollama".to_string()
}
fn default_model() -> String {
    "llama3.1:8b".to_string()
}
fn default_endpoint() -> String {
    "http://127.0.0.1:11434".to_string()
}
fn default_guard_id() -> String {
    "guard-agent".to_string()
}
fn default_guard_workspace() -> String {
    ".a3s/guard-workspace".to_string()
}
fn default_base_dir() -> String {
    dirs::home_dir()
        .map(|h| h.join(".a3s").to_string_lossy().to_string())
        .unwrap_or_else(|| ".a3s".to_string())
}

fn default_checkpoint_detectors() -> Vec<String> {
    vec!["ruleDetector".to_string(), "localModelDetector".to_string()]
}

fn default_keywords() -> TierKeywordsPatterns {
    TierKeywordsPatterns {
        s2: vec![
            "phone".into(),
            "address".into(),
            "email".into(),
            "salary".into(),
            "birthday".into(),
        ],
        s3: vec![
            "private key".into(),
            "ssh key".into(),
            "password".into(),
            "ssn".into(),
            "social security".into(),
        ],
    }
}

fn default_patterns() -> TierKeywordsPatterns {
    TierKeywordsPatterns {
        s2: vec![
            r"\b1[3-9]\d{9}\b".into(),                 // CN mobile numbers
            r"[\w.+-]+@[\w-]+\.[\w.-]+".into(),        // email
        ],
        s3: vec![
            r"-----BEGIN [A-Z ]*PRIVATE KEY-----".into(),
            r"sk-[A-Za-z0-9]{16,}".into(),
        ],
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            patterns: default_patterns(),
            tools: TierToolRules::default(),
        }
    }
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: default_provider(),
            model: default_model(),
            endpoint: default_endpoint(),
        }
    }
}

impl Default for GuardAgentConfig {
    fn default() -> Self {
        Self {
            id: default_guard_id(),
            workspace: default_guard_workspace(),
            model: default_model(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            isolate_guard_history: true,
            base_dir: default_base_dir(),
        }
    }
}

impl Default for CheckpointDetectors {
    fn default() -> Self {
        Self {
            on_user_message: default_checkpoint_detectors(),
            on_tool_call_proposed: default_checkpoint_detectors(),
            on_tool_call_executed: default_checkpoint_detectors(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            checkpoints: CheckpointDetectors::default(),
            rules: RuleConfig::default(),
            local_model: LocalModelConfig::default(),
            guard_agent: GuardAgentConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Load from a YAML or JSON file, determined by extension. Falls back to
    /// `Config::default()` if no file exists at the path.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PrivacyError::ConfigInvalid(format!("reading {path:?}: {e}")))?;
        Self::parse(&raw, path.extension().and_then(|e| e.to_str()).unwrap_or("yaml"))
    }

    fn parse(raw: &str, ext: &str) -> Result<Self> {
        match ext {
            "json" => serde_json::from_str(raw)
                .map_err(|e| PrivacyError::ConfigInvalid(format!("invalid JSON config: {e}"))),
            _ => serde_yaml::from_str(raw)
                .map_err(|e| PrivacyError::ConfigInvalid(format!("invalid YAML config: {e}"))),
        }
    }

    /// Detector kinds enabled for a given checkpoint, per the `checkpoints` map.
    pub fn detectors_for(&self, checkpoint: Checkpoint) -> Vec<DetectorKind> {
        let names: &[String] = match checkpoint {
            Checkpoint::MessageReceived | Checkpoint::ResolveModel => {
                &self.checkpoints.on_user_message
            }
            Checkpoint::BeforeToolCall => &self.checkpoints.on_tool_call_proposed,
            Checkpoint::AfterToolCall | Checkpoint::ToolResultPersist => {
                &self.checkpoints.on_tool_call_executed
            }
            Checkpoint::SessionEnd => &[],
        };
        names
            .iter()
            .filter_map(|n| match n.as_str() {
                "ruleDetector" => Some(DetectorKind::Rule),
                "localModelDetector" => Some(DetectorKind::Semantic),
                _ => None,
            })
            .collect()
    }

    pub fn protected_roots(&self) -> Vec<String> {
        let base = &self.session.base_dir;
        vec![format!("{base}/MEMORY-FULL.md"), format!("{base}/memory-full")]
    }

    /// Whether `path` falls under the per-agent `sessions/full/` history —
    /// the one part of the agents tree §4.9 protects; `sessions/clean/` is
    /// meant for cloud delivery and must stay readable.
    pub fn is_full_track_path(&self, path: &str) -> bool {
        let agents_root = format!("{}/agents", self.session.base_dir);
        path.starts_with(&agents_root) && path.contains("/sessions/full/")
    }
}

/// Path-keyed tool argument extraction recognizes these keys (§4.1).
pub const PATH_PARAM_KEYS: &[&str] = &[
    "path", "file", "filepath", "filename", "dir", "directory", "target", "source",
];

/// Extensions that always force `S3` regardless of configuration (§4.1).
pub const FORCED_S3_EXTENSIONS: &[&str] = &["pem", "key", "p12", "pfx"];
pub const FORCED_S3_SUBSTRINGS: &[&str] = &["id_rsa", "id_dsa", "id_ecdsa", "id_ed25519"];

/// Extensions recognized for the pre-read file registry (§4.6).
pub const PRE_READ_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv", "txt", "docx", "json", "md"];

pub type ConfigMap = HashMap<String, serde_json::Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_enabled() {
        let cfg = Config::default();
        assert!(cfg.enabled);
        assert!(cfg.local_model.enabled);
    }

    #[test]
    fn detectors_for_checkpoint_maps_onto_configured_names() {
        let cfg = Config::default();
        let detectors = cfg.detectors_for(Checkpoint::MessageReceived);
        assert!(detectors.contains(&DetectorKind::Rule));
        assert!(detectors.contains(&DetectorKind::Semantic));
        assert!(cfg.detectors_for(Checkpoint::SessionEnd).is_empty());
    }

    #[test]
    fn rejects_unknown_top_level_keys() {
        let raw = "enabled: true\nbogus_key: 1\n";
        let result = Config::parse(raw, "yaml");
        assert!(result.is_err());
    }

    /// §6's documented external schema is camelCase with uppercase tier keys
    /// (`localModel`, `guardAgent`, `session.isolateGuardHistory`,
    /// `session.baseDir`, `checkpoints.onUserMessage`, `rules.keywords.S2`) —
    /// this must parse as written in the spec, not in the structs' own
    /// snake_case Rust field names.
    #[test]
    fn parses_the_documented_camel_case_wire_shape() {
        let raw = r#"
enabled: true
checkpoints:
  onUserMessage: ["ruleDetector"]
  onToolCallProposed: ["ruleDetector"]
  onToolCallExecuted: ["ruleDetector"]
rules:
  keywords:
    S2: ["phone"]
    S3: ["password"]
  patterns:
    S2: []
    S3: []
  tools:
    S2:
      tools: []
      paths: []
    S3:
      tools: []
      paths: []
localModel:
  enabled: false
  provider: ollama
  model: llama3.1:8b
  endpoint: http://127.0.0.1:11434
guardAgent:
  id: guard-agent
  workspace: .a3s/guard-workspace
  model: llama3.1:8b
session:
  isolateGuardHistory: true
  baseDir: /tmp/a3s
"#;
        let cfg = Config::parse(raw, "yaml").expect("documented camelCase shape must parse");
        assert_eq!(cfg.checkpoints.on_user_message, vec!["ruleDetector"]);
        assert_eq!(cfg.rules.keywords.s2, vec!["phone"]);
        assert_eq!(cfg.rules.keywords.s3, vec!["password"]);
        assert!(!cfg.local_model.enabled);
        assert_eq!(cfg.session.base_dir, "/tmp/a3s");
        assert!(cfg.session.isolate_guard_history);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = Config::load(Path::new("/nonexistent/path/to/config.yaml")).unwrap();
        assert!(cfg.enabled);
    }
}
