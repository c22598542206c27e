use serde::{Deserialize, Serialize};

use super::{REPEATED_READ_LIST_MAX, Recommendation, RecommendationThresholds, Severity};
use crate::diagnostics::DiagnosticReport;

/// Rules in evaluation order; the order breaks severity ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    RepeatedReads,
    LowCacheHitRate,
    FrequentCompaction,
    ToolCallVolume,
    ContextPressure,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::RepeatedReads => "repeated_reads",
            RuleKind::LowCacheHitRate => "low_cache_hit_rate",
            RuleKind::FrequentCompaction => "frequent_compaction",
            RuleKind::ToolCallVolume => "tool_call_volume",
            RuleKind::ContextPressure => "context_pressure",
        }
    }
}

/// Message and evidence for a rule that fired.
struct Finding {
    message: String,
    evidence: String,
}

type CheckFn = Box<dyn Fn(&DiagnosticReport, &RecommendationThresholds) -> Option<Finding>>;

pub struct Rule {
    pub kind: RuleKind,
    pub severity: Severity,
    check: CheckFn,
}

impl Rule {
    pub fn all() -> Vec<Rule> {
        vec![
            Rule::repeated_reads(),
            Rule::low_cache_hit_rate(),
            Rule::frequent_compaction(),
            Rule::tool_call_volume(),
            Rule::context_pressure(),
        ]
    }

    pub fn repeated_reads() -> Self {
        Self {
            kind: RuleKind::RepeatedReads,
            severity: Severity::High,
            check: Box::new(|r, t| {
                let mut repeated: Vec<_> = r
                    .files
                    .iter()
                    .filter(|f| f.reads >= t.repeated_read_min)
                    .collect();
                if repeated.is_empty() {
                    return None;
                }
                repeated.sort_by(|a, b| b.reads.cmp(&a.reads).then_with(|| a.path.cmp(&b.path)));

                let named: Vec<String> = repeated
                    .iter()
                    .take(REPEATED_READ_LIST_MAX)
                    .map(|f| format!("`{}` ({}x)", f.path, f.reads))
                    .collect();
                Some(Finding {
                    message: format!(
                        "Files were re-read repeatedly: {}. Add their key types and exports to CLAUDE.md.",
                        named.join(", ")
                    ),
                    evidence: format!(
                        "{} file(s) read {}+ times",
                        repeated.len(),
                        t.repeated_read_min
                    ),
                })
            }),
        }
    }

    pub fn low_cache_hit_rate() -> Self {
        Self {
            kind: RuleKind::LowCacheHitRate,
            severity: Severity::Medium,
            check: Box::new(|r, t| {
                let rate = r.cache.hit_rate?;
                (rate < t.low_cache_hit_rate).then(|| Finding {
                    message: format!(
                        "Cache hit rate was {:.0}%. Stable project context in CLAUDE.md improves cache reuse.",
                        rate * 100.0
                    ),
                    evidence: format!(
                        "cache reads {} of {} input-side tokens",
                        r.cache.cache_read_tokens,
                        r.cache.cache_read_tokens + r.cache.input_tokens
                    ),
                })
            }),
        }
    }

    pub fn frequent_compaction() -> Self {
        Self {
            kind: RuleKind::FrequentCompaction,
            severity: Severity::Medium,
            check: Box::new(|r, t| {
                let count = r.context.compactions.len() as u64;
                (count >= t.compaction_count_max).then(|| Finding {
                    message: format!(
                        "Context was compacted {count} times. Break complex tasks into smaller, focused sessions."
                    ),
                    evidence: format!(
                        "{count} compaction events, {} tokens lost",
                        r.context
                            .compactions
                            .iter()
                            .map(|c| c.estimated_tokens_lost)
                            .sum::<u64>()
                    ),
                })
            }),
        }
    }

    pub fn tool_call_volume() -> Self {
        Self {
            kind: RuleKind::ToolCallVolume,
            severity: Severity::Low,
            check: Box::new(|r, t| {
                let count = r.session.tool_call_count;
                (count >= t.tool_call_count_max).then(|| Finding {
                    message: format!(
                        "Session made {count} tool calls. A project map in CLAUDE.md can cut exploratory reads."
                    ),
                    evidence: format!("{count} total tool calls"),
                })
            }),
        }
    }

    pub fn context_pressure() -> Self {
        Self {
            kind: RuleKind::ContextPressure,
            severity: Severity::Medium,
            check: Box::new(|r, t| {
                let utilization = r.context.peak_utilization;
                (utilization >= t.context_pressure_min).then(|| Finding {
                    message: format!(
                        "Context peaked at {:.0}% of the window. Clear or split context between subtasks.",
                        utilization * 100.0
                    ),
                    evidence: format!("peak {} tokens", r.context.peak_tokens),
                })
            }),
        }
    }

    pub fn evaluate(
        &self,
        report: &DiagnosticReport,
        thresholds: &RecommendationThresholds,
    ) -> Option<Recommendation> {
        (self.check)(report, thresholds).map(|finding| Recommendation {
            rule: self.kind,
            severity: self.severity,
            message: finding.message,
            evidence: finding.evidence,
        })
    }
}
