//! Lifecycle checkpoints and the detection context passed through them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One of the six points in the agent lifecycle at which the orchestrator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Checkpoint {
    MessageReceived,
    ResolveModel,
    BeforeToolCall,
    AfterToolCall,
    ToolResultPersist,
    SessionEnd,
}

impl std::fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Checkpoint::MessageReceived => "message_received",
            Checkpoint::ResolveModel => "resolve_model",
            Checkpoint::BeforeToolCall => "before_tool_call",
            Checkpoint::AfterToolCall => "after_tool_call",
            Checkpoint::ToolResultPersist => "tool_result_persist",
            Checkpoint::SessionEnd => "session_end",
        };
        write!(f, "{s}")
    }
}

/// The union of optional fields observable at any checkpoint. Not all fields are
/// populated at every checkpoint — see the table in `Checkpoint`'s documentation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionContext {
    pub message_text: Option<String>,
    pub tool_name: Option<String>,
    pub tool_params: Option<Value>,
    pub tool_result: Option<String>,
    pub file_content_snippet: Option<String>,
    pub session_key: String,
    pub agent_id: String,
}

impl DetectionContext {
    pub fn new(session_key: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            session_key: session_key.into(),
            agent_id: agent_id.into(),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        self.message_text = Some(text.into());
        self
    }

    pub fn with_tool(mut self, name: impl Into<String>, params: Value) -> Self {
        self.tool_name = Some(name.into());
        self.tool_params = Some(params);
        self
    }

    pub fn with_tool_result(mut self, result: impl Into<String>) -> Self {
        self.tool_result = Some(result.into());
        self
    }

    pub fn with_file_content(mut self, content: impl Into<String>) -> Self {
        self.file_content_snippet = Some(content.into());
        self
    }

    /// A session key containing `:guard:` marks a local-only context.
    pub fn is_guard_session(&self) -> bool {
        is_guard_session_key(&self.session_key)
    }
}

/// Whether `session_key` marks a local-only, guard context (§3). The single
/// source of truth for this check — callers that only have a bare session
/// key (e.g. the file-access guard) use this directly instead of
/// re-implementing the substring test.
pub fn is_guard_session_key(session_key: &str) -> bool {
    session_key.contains(":guard:")
}
