use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::usage::TokenUsage;

/// Outcome recorded for a source file after its last full parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStatus {
    /// At least one session persisted
    Ok,
    /// Readable, but contained no sessions
    Empty,
    /// Unreadable, or nothing but malformed lines
    Malformed,
}

impl IngestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStatus::Ok => "ok",
            IngestStatus::Empty => "empty",
            IngestStatus::Malformed => "malformed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ok" => Some(IngestStatus::Ok),
            "empty" => Some(IngestStatus::Empty),
            "malformed" => Some(IngestStatus::Malformed),
            _ => None,
        }
    }
}

/// One row per source file; drives incremental skip logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestLogEntry {
    pub source_file: String,
    pub file_size: u64,
    /// Modification time as of the last successful full parse (ns since epoch).
    pub mtime_ns: i64,
    pub status: IngestStatus,
    pub session_count: u64,
    pub skipped_lines: u64,
    pub ingested_at: DateTime<Utc>,
}

/// Rollup key: one row per (date, project).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DailyKey {
    pub date: NaiveDate,
    pub project_name: String,
}

/// Pre-aggregated daily rollup, always recomputed from session rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub project_name: String,
    /// Distinct session ids started on `date`.
    pub session_count: u64,
    pub message_count: u64,
    pub tool_call_count: u64,
    pub usage: TokenUsage,
    pub estimated_cost_usd: f64,
    pub active_seconds: i64,
}

impl DailyStat {
    pub fn key(&self) -> DailyKey {
        DailyKey {
            date: self.date,
            project_name: self.project_name.clone(),
        }
    }
}
