use aide_types::{ContentKind, Message, Role, TokenUsage, ToolCall, ToolKind};
use chrono::{DateTime, TimeZone, Utc};

fn ts(turn: u64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_767_600_000 + turn as i64 * 10, 0).unwrap()
}

fn message(turn: u64, role: Role) -> Message {
    Message {
        session_id: "s1".to_string(),
        uuid: format!("m{turn}"),
        parent_uuid: None,
        turn_index: turn,
        role,
        content_kind: ContentKind::Text,
        timestamp: ts(turn),
        model: None,
        api_call_id: None,
        is_api_call: false,
        usage: TokenUsage::default(),
        cost_usd: 0.0,
        content_length: 0,
        tool_calls: Vec::new(),
    }
}

pub fn user(turn: u64) -> Message {
    message(turn, Role::User)
}

pub fn assistant(turn: u64) -> Message {
    message(turn, Role::Assistant)
}

pub fn assistant_with_tool(turn: u64, name: &str, kind: ToolKind) -> Message {
    let mut m = assistant(turn);
    m.content_kind = ContentKind::ToolUse;
    m.tool_calls.push(ToolCall {
        tool_use_id: format!("toolu_{turn}"),
        tool_name: name.to_string(),
        kind,
        file_path: None,
        is_error: false,
        timestamp: ts(turn),
    });
    m
}

pub fn tool_on_path(turn: u64, kind: ToolKind, path: &str) -> Message {
    let mut m = assistant_with_tool(turn, kind.as_str(), kind);
    m.tool_calls[0].file_path = Some(path.to_string());
    m
}

pub fn api_call(turn: u64, input: u64, cache_read: u64, cache_write: u64) -> Message {
    let mut m = assistant(turn);
    m.model = Some("claude-sonnet-4-5".to_string());
    m.api_call_id = Some(format!("msg_{turn}"));
    m.is_api_call = true;
    m.usage = TokenUsage::new(input, 0, cache_write, cache_read);
    m
}
