// Recommendation engine: threshold rules over a diagnostic report

mod rules;

pub use rules::{Rule, RuleKind};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::diagnostics::DiagnosticReport;

/// A path read at least this many times is worth documenting.
pub const REPEATED_READ_MIN: u64 = 3;
/// Files named in the repeated-reads suggestion.
pub const REPEATED_READ_LIST_MAX: usize = 5;
pub const LOW_CACHE_HIT_RATE: f64 = 0.5;
pub const COMPACTION_COUNT_MAX: u64 = 2;
pub const TOOL_CALL_COUNT_MAX: u64 = 50;
pub const CONTEXT_PRESSURE_MIN: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    pub repeated_read_min: u64,
    pub low_cache_hit_rate: f64,
    pub compaction_count_max: u64,
    pub tool_call_count_max: u64,
    pub context_pressure_min: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            repeated_read_min: REPEATED_READ_MIN,
            low_cache_hit_rate: LOW_CACHE_HIT_RATE,
            compaction_count_max: COMPACTION_COUNT_MAX,
            tool_call_count_max: TOOL_CALL_COUNT_MAX,
            context_pressure_min: CONTEXT_PRESSURE_MIN,
        }
    }
}

/// Ordered most to least urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub rule: RuleKind,
    pub severity: Severity,
    pub message: String,
    pub evidence: String,
}

/// Evaluate every rule and rank the results by severity, then rule order.
pub fn recommend(
    report: &DiagnosticReport,
    thresholds: &RecommendationThresholds,
) -> Vec<Recommendation> {
    let mut found: Vec<Recommendation> = Rule::all()
        .iter()
        .filter_map(|rule| rule.evaluate(report, thresholds))
        .collect();
    found.sort_by_key(|r| (r.severity, r.rule));
    found
}
