use serde::Deserialize;
use serde_json::Value;

/// One line of a Claude Code session log.
///
/// Only the record kinds that carry conversation content are modelled;
/// snapshots, summaries and progress lines fall into `Unknown` and are ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ClaudeRecord {
    User(UserRecord),
    Assistant(AssistantRecord),
    System(SystemRecord),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserRecord {
    pub uuid: String,
    #[serde(default)]
    pub parent_uuid: Option<String>,
    pub session_id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub message: UserMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserMessage {
    #[serde(deserialize_with = "deserialize_user_content")]
    pub content: Vec<UserContent>,
}

fn deserialize_user_content<'de, D>(deserializer: D) -> Result<Vec<UserContent>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrArray {
        String(String),
        Array(Vec<UserContent>),
    }

    match StringOrArray::deserialize(deserializer)? {
        StringOrArray::String(s) => Ok(vec![UserContent::Text { text: s }]),
        StringOrArray::Array(arr) => Ok(arr),
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub(crate) enum UserContent {
    Text {
        #[serde(default)]
        text: String,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        is_error: Option<bool>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssistantRecord {
    pub uuid: String,
    #[serde(default)]
    pub parent_uuid: Option<String>,
    pub session_id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssistantMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub content: Vec<AssistantContent>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub(crate) enum AssistantContent {
    Text {
        #[serde(default)]
        text: String,
    },
    Thinking {
        #[serde(default)]
        thinking: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenUsage {
    #[serde(default)]
    pub input_tokens: Option<u64>,
    #[serde(default)]
    pub output_tokens: Option<u64>,
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u64>,
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
}

impl TokenUsage {
    pub fn to_usage(&self) -> aide_types::TokenUsage {
        aide_types::TokenUsage::new(
            self.input_tokens.unwrap_or(0),
            self.output_tokens.unwrap_or(0),
            self.cache_creation_input_tokens.unwrap_or(0),
            self.cache_read_input_tokens.unwrap_or(0),
        )
    }
}

/// System lines (e.g. `compact_boundary`) carry no `message`, only top-level content.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SystemRecord {
    pub uuid: String,
    #[serde(default)]
    pub parent_uuid: Option<String>,
    pub session_id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_lines_are_unknown() {
        let line = r#"{"type":"file-history-snapshot","messageId":"m1","snapshot":{"files":[]}}"#;
        let record: ClaudeRecord = serde_json::from_str(line).unwrap();
        assert!(matches!(record, ClaudeRecord::Unknown));
    }

    #[test]
    fn test_user_string_content_becomes_text_block() {
        let line = r#"{"type":"user","uuid":"u1","sessionId":"s1","timestamp":"2026-01-01T00:00:00Z","message":{"role":"user","content":"hello"}}"#;
        let record: ClaudeRecord = serde_json::from_str(line).unwrap();
        match record {
            ClaudeRecord::User(user) => {
                assert!(matches!(&user.message.content[0], UserContent::Text { text } if text == "hello"));
            }
            other => panic!("expected user record, got {:?}", other),
        }
    }

    #[test]
    fn test_user_without_session_id_is_an_error() {
        let line = r#"{"type":"user","uuid":"u1","message":{"role":"user","content":"hello"}}"#;
        assert!(serde_json::from_str::<ClaudeRecord>(line).is_err());
    }
}
