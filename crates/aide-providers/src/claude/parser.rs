use aide_types::{
    ContentKind, Message, Role, Session, SessionTranscript, TokenUsage, ToolCall, ToolKind,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::schema::*;
use super::tool_mapping::{classify_tool, extract_target_path};
use crate::project::{derive_project_name, project_dir_name};

/// Result of parsing one log file.
///
/// Sessions are unpriced: costs, work blocks and context statistics are
/// filled in by the engine before persistence.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub transcripts: Vec<SessionTranscript>,
    /// Non-blank lines that could not be used (bad JSON, missing fields, bad timestamp)
    pub skipped_lines: u64,
    pub rejected_sessions: Vec<RejectedSession>,
}

/// Session dropped because none of its events had a usable timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedSession {
    pub session_id: String,
    pub reason: String,
}

/// One usable line before it is placed in its session.
struct Event {
    timestamp: Option<DateTime<Utc>>,
    message: Message,
    /// Tool results carried by a user line: (tool_use_id, is_error)
    tool_results: Vec<(String, bool)>,
}

/// Parse Claude timestamp to DateTime<Utc>
fn parse_timestamp(ts: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts?)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn blank_message(
    session_id: String,
    uuid: String,
    parent_uuid: Option<String>,
    role: Role,
    timestamp: DateTime<Utc>,
) -> Message {
    Message {
        session_id,
        uuid,
        parent_uuid,
        turn_index: 0,
        role,
        content_kind: ContentKind::Text,
        timestamp,
        model: None,
        api_call_id: None,
        is_api_call: false,
        usage: TokenUsage::default(),
        cost_usd: 0.0,
        content_length: 0,
        tool_calls: Vec::new(),
    }
}

fn user_event(record: UserRecord) -> Event {
    let timestamp = parse_timestamp(record.timestamp.as_deref());
    let mut message = blank_message(
        record.session_id,
        record.uuid,
        record.parent_uuid,
        Role::User,
        timestamp.unwrap_or_default(),
    );

    let mut tool_results = Vec::new();
    let mut has_text = false;
    for block in record.message.content {
        match block {
            UserContent::Text { text } => {
                has_text = true;
                message.content_length += text.chars().count() as u64;
            }
            UserContent::ToolResult {
                tool_use_id,
                is_error,
            } => tool_results.push((tool_use_id, is_error.unwrap_or(false))),
            UserContent::Unknown => {}
        }
    }

    message.content_kind = if !tool_results.is_empty() && !has_text {
        ContentKind::ToolResult
    } else {
        ContentKind::Text
    };

    Event {
        timestamp,
        message,
        tool_results,
    }
}

fn assistant_event(record: AssistantRecord) -> Event {
    let timestamp = parse_timestamp(record.timestamp.as_deref());
    let ts = timestamp.unwrap_or_default();
    let mut message = blank_message(
        record.session_id,
        record.uuid,
        record.parent_uuid,
        Role::Assistant,
        ts,
    );
    message.model = record.message.model;
    message.api_call_id = record.message.id;
    if let Some(usage) = &record.message.usage {
        message.usage = usage.to_usage();
        message.is_api_call = true;
    }

    let mut has_text = false;
    let mut has_thinking = false;
    for block in record.message.content {
        match block {
            AssistantContent::Text { text } => {
                has_text = true;
                message.content_length += text.chars().count() as u64;
            }
            AssistantContent::Thinking { thinking } => {
                has_thinking = true;
                message.content_length += thinking.chars().count() as u64;
            }
            AssistantContent::ToolUse { id, name, input } => {
                message.tool_calls.push(ToolCall {
                    tool_use_id: id,
                    kind: classify_tool(&name),
                    file_path: extract_target_path(&input),
                    tool_name: name,
                    is_error: false,
                    timestamp: ts,
                });
            }
            AssistantContent::Unknown => {}
        }
    }

    message.content_kind = if !message.tool_calls.is_empty() {
        ContentKind::ToolUse
    } else if has_thinking && !has_text {
        ContentKind::Thinking
    } else {
        ContentKind::Text
    };

    Event {
        timestamp,
        message,
        tool_results: Vec::new(),
    }
}

fn system_event(record: SystemRecord) -> Event {
    let timestamp = parse_timestamp(record.timestamp.as_deref());
    let mut message = blank_message(
        record.session_id,
        record.uuid,
        record.parent_uuid,
        Role::System,
        timestamp.unwrap_or_default(),
    );
    if let Some(text) = record.content.as_ref().and_then(|c| c.as_str()) {
        message.content_length = text.chars().count() as u64;
    }

    Event {
        timestamp,
        message,
        tool_results: Vec::new(),
    }
}

/// Incremental parser state for one file.
pub(crate) struct FileParser<'a> {
    source: &'a Path,
    /// Session ids in order of first appearance, with their events
    sessions: Vec<(String, Vec<Event>)>,
    index: HashMap<String, usize>,
    skipped_lines: u64,
}

impl<'a> FileParser<'a> {
    pub(crate) fn new(source: &'a Path) -> Self {
        Self {
            source,
            sessions: Vec::new(),
            index: HashMap::new(),
            skipped_lines: 0,
        }
    }

    pub(crate) fn push_line(&mut self, line_no: usize, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        let record: ClaudeRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(err) => {
                tracing::debug!(
                    path = %self.source.display(),
                    line = line_no,
                    error = %err,
                    "skipping unparsable line"
                );
                self.skipped_lines += 1;
                return;
            }
        };

        let event = match record {
            ClaudeRecord::User(user) => user_event(user),
            ClaudeRecord::Assistant(asst) => assistant_event(asst),
            ClaudeRecord::System(sys) => system_event(sys),
            ClaudeRecord::Unknown => return,
        };

        let session_id = event.message.session_id.clone();
        let slot = match self.index.get(&session_id) {
            Some(&i) => i,
            None => {
                self.sessions.push((session_id.clone(), Vec::new()));
                self.index.insert(session_id, self.sessions.len() - 1);
                self.sessions.len() - 1
            }
        };
        self.sessions[slot].1.push(event);
    }

    pub(crate) fn finish(self) -> ParseOutcome {
        let project_path = project_dir_name(self.source);
        let project_name = derive_project_name(&project_path);
        let source_file = self.source.to_string_lossy().into_owned();

        let mut outcome = ParseOutcome {
            skipped_lines: self.skipped_lines,
            ..Default::default()
        };

        for (session_id, events) in self.sessions {
            let total = events.len();
            let timed: Vec<Event> = events
                .into_iter()
                .filter(|e| e.timestamp.is_some())
                .collect();

            if timed.is_empty() {
                tracing::warn!(
                    path = %self.source.display(),
                    session_id = %session_id,
                    "rejecting session with no valid timestamps"
                );
                outcome.rejected_sessions.push(RejectedSession {
                    session_id,
                    reason: "no event carries a valid timestamp".to_string(),
                });
                continue;
            }
            outcome.skipped_lines += (total - timed.len()) as u64;

            let messages = assemble_messages(timed);
            let session = summarize(
                session_id,
                &project_path,
                &project_name,
                &source_file,
                &messages,
            );
            outcome.transcripts.push(SessionTranscript { session, messages });
        }

        outcome
    }
}

/// Order events, attribute usage once per API call, and link tool results.
fn assemble_messages(events: Vec<Event>) -> Vec<Message> {
    let mut seen_calls: HashSet<String> = HashSet::new();
    let mut outcomes: HashMap<String, bool> = HashMap::new();
    let mut messages = Vec::with_capacity(events.len());

    // Fragments of one API response repeat the same usage; only the first counts.
    for event in events {
        let mut message = event.message;
        if message.is_api_call
            && let Some(call_id) = &message.api_call_id
            && !seen_calls.insert(call_id.clone())
        {
            message.is_api_call = false;
            message.usage = TokenUsage::default();
        }
        for (tool_use_id, is_error) in event.tool_results {
            let entry = outcomes.entry(tool_use_id).or_insert(false);
            *entry |= is_error;
        }
        messages.push(message);
    }

    messages.sort_by_key(|m| m.timestamp);

    for (i, message) in messages.iter_mut().enumerate() {
        message.turn_index = i as u64;
        for call in &mut message.tool_calls {
            if let Some(&is_error) = outcomes.get(&call.tool_use_id) {
                call.is_error = is_error;
            }
        }
    }

    messages
}

fn summarize(
    session_id: String,
    project_path: &str,
    project_name: &str,
    source_file: &str,
    messages: &[Message],
) -> Session {
    let started_at = messages.first().map(|m| m.timestamp).unwrap_or_default();
    let ended_at = messages.last().map(|m| m.timestamp).unwrap_or(started_at);

    let mut usage = TokenUsage::default();
    let mut session = Session {
        session_id,
        project_path: project_path.to_string(),
        project_name: project_name.to_string(),
        source_file: source_file.to_string(),
        started_at,
        ended_at,
        duration_seconds: (ended_at - started_at).num_seconds(),
        active_duration_seconds: 0,
        usage: TokenUsage::default(),
        estimated_cost_usd: 0.0,
        message_count: messages.len() as u64,
        user_message_count: 0,
        assistant_message_count: 0,
        tool_call_count: 0,
        read_count: 0,
        write_count: 0,
        edit_count: 0,
        command_count: 0,
        compaction_count: 0,
        peak_context_tokens: 0,
        work_blocks: Vec::new(),
    };

    for message in messages {
        usage += message.usage;
        match message.role {
            Role::User => session.user_message_count += 1,
            Role::Assistant => session.assistant_message_count += 1,
            Role::System => {}
        }
        for call in &message.tool_calls {
            session.tool_call_count += 1;
            match call.kind {
                ToolKind::Read => session.read_count += 1,
                ToolKind::Write => session.write_count += 1,
                ToolKind::Edit => session.edit_count += 1,
                ToolKind::Execute => session.command_count += 1,
                _ => {}
            }
        }
    }
    session.usage = usage;

    session
}
