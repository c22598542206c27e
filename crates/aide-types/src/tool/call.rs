use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ToolKind;

/// A single tool invocation extracted from an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned id linking the invocation to its result.
    pub tool_use_id: String,
    pub tool_name: String,
    pub kind: ToolKind,
    /// Target file, for tools that operate on one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Set when the matching tool result reported an error.
    pub is_error: bool,
    pub timestamp: DateTime<Utc>,
}
