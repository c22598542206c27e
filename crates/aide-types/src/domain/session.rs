use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::Message;
use super::usage::TokenUsage;

/// Contiguous span of activity inside a session, bounded by idle gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkBlock {
    pub index: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// `ended_at - started_at`; zero for a single-message block.
    pub active_seconds: i64,
    pub message_count: u64,
}

/// Session aggregate as persisted in the store.
///
/// A session resumed across several log files is stored as one fragment per
/// file; read queries merge fragments sharing a `session_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    /// Encoded project directory name (e.g. `-Users-alice-projects-shop`)
    pub project_path: String,
    pub project_name: String,
    pub source_file: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Wall-clock span from first to last message.
    pub duration_seconds: i64,
    /// Sum of work-block durations.
    pub active_duration_seconds: i64,
    pub usage: TokenUsage,
    pub estimated_cost_usd: f64,
    pub message_count: u64,
    pub user_message_count: u64,
    pub assistant_message_count: u64,
    pub tool_call_count: u64,
    pub read_count: u64,
    pub write_count: u64,
    pub edit_count: u64,
    pub command_count: u64,
    pub compaction_count: u64,
    pub peak_context_tokens: u64,
    #[serde(default)]
    pub work_blocks: Vec<WorkBlock>,
}

/// A session together with its chronologically ordered messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTranscript {
    pub session: Session,
    pub messages: Vec<Message>,
}

impl SessionTranscript {
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.messages.iter().map(|m| m.timestamp).collect()
    }
}
