use aide_types::TokenUsage;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-wide totals for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Distinct session ids.
    pub total_sessions: u64,
    pub total_messages: u64,
    pub total_cost_usd: f64,
    pub usage: TokenUsage,
    pub project_count: u64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Most expensive first.
    pub projects: Vec<ProjectTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTotals {
    pub project_name: String,
    pub session_count: u64,
    pub message_count: u64,
    pub estimated_cost_usd: f64,
    pub usage: TokenUsage,
}

/// Calls of one tool within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUsage {
    pub tool_name: String,
    pub count: u64,
    pub error_count: u64,
}
