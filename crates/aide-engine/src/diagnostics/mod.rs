// Diagnostic analyzer: per-session cost attribution, context pressure and cache use
// Every function is pure over an already loaded transcript

mod cache;
mod category;
mod context;
mod files;
mod turns;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache::{CacheEfficiency, CallCacheRate, analyze_cache, cache_hit_rate};
pub use category::{CategoryCost, CostCategory, categorize, cost_by_category};
pub use context::{
    CompactionEvent, ContextAnalysis, ContextPoint, analyze_context, context_curve,
    detect_compactions,
};
pub use files::{FileAccess, file_access_counts};
pub use turns::{ExpensiveTurn, TOP_TURNS, ToolCount, most_expensive_turns, tool_breakdown};

use aide_types::{Session, SessionTranscript};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::cost::{CostWarning, PricingTable};

pub const DEFAULT_CONTEXT_WINDOW: u64 = 200_000;
pub const DEFAULT_COMPACTION_DROP_FRACTION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Token ceiling used for utilization.
    pub context_window: u64,
    /// A call-to-call drop larger than this fraction counts as a compaction.
    pub compaction_drop_fraction: f64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            context_window: DEFAULT_CONTEXT_WINDOW,
            compaction_drop_fraction: DEFAULT_COMPACTION_DROP_FRACTION,
        }
    }
}

/// Everything the analyzer derives for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub session: Session,
    pub total_cost_usd: f64,
    pub categories: Vec<CategoryCost>,
    pub top_turns: Vec<ExpensiveTurn>,
    pub tool_breakdown: Vec<ToolCount>,
    pub context: ContextAnalysis,
    pub cache: CacheEfficiency,
    pub files: Vec<FileAccess>,
    /// Models priced at the default rate.
    pub unknown_models: Vec<String>,
}

/// Analyze a loaded session.
///
/// Messages are re-priced with `pricing`, so the report follows the current
/// table rather than the one in effect at ingest time.
pub fn analyze(
    transcript: &SessionTranscript,
    pricing: &PricingTable,
    config: &DiagnosticsConfig,
) -> DiagnosticReport {
    let messages = &transcript.messages;
    let mut unknown_models = BTreeSet::new();
    let costs: Vec<f64> = messages
        .iter()
        .map(|m| {
            let estimate = pricing.estimate(&m.usage, m.model.as_deref());
            if let Some(CostWarning::UnknownModel { model }) = estimate.warning {
                unknown_models.insert(model);
            }
            estimate.usd
        })
        .collect();

    DiagnosticReport {
        session: transcript.session.clone(),
        total_cost_usd: costs.iter().sum(),
        categories: cost_by_category(messages, &costs),
        top_turns: most_expensive_turns(messages, &costs),
        tool_breakdown: tool_breakdown(messages),
        context: analyze_context(
            messages,
            config.context_window,
            config.compaction_drop_fraction,
        ),
        cache: analyze_cache(messages, pricing),
        files: file_access_counts(messages),
        unknown_models: unknown_models.into_iter().collect(),
    }
}
