use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::usage::TokenUsage;
use crate::ToolCall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "system" => Some(Role::System),
            _ => None,
        }
    }
}

/// Dominant content of a message.
///
/// A message mixing several block types is labelled by the first match in
/// the order tool-use, tool-result, text, thinking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    ToolUse,
    ToolResult,
    Thinking,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::ToolUse => "tool_use",
            ContentKind::ToolResult => "tool_result",
            ContentKind::Thinking => "thinking",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(ContentKind::Text),
            "tool_use" => Some(ContentKind::ToolUse),
            "tool_result" => Some(ContentKind::ToolResult),
            "thinking" => Some(ContentKind::Thinking),
            _ => None,
        }
    }
}

/// One logical event of a session transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub session_id: String,
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<String>,
    /// Ordinal position within the session (chronological, from 0).
    pub turn_index: u64,
    pub role: Role,
    pub content_kind: ContentKind,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// API response id shared by all fragments of one assistant call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_call_id: Option<String>,
    /// True for the single fragment that carries a call's usage.
    pub is_api_call: bool,
    pub usage: TokenUsage,
    /// Cost of `usage` at this message's model rate (0 until priced).
    pub cost_usd: f64,
    pub content_length: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    pub fn first_tool(&self) -> Option<&ToolCall> {
        self.tool_calls.first()
    }
}
