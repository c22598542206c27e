// Engine module - pure computations over parsed sessions
// No I/O here: pricing and thresholds are passed in explicitly

pub mod cost;
pub mod diagnostics;
pub mod enrich;
pub mod recommendations;
pub mod work_blocks;

pub use cost::{CostEstimate, CostLabel, CostWarning, LabeledCost, ModelRates, PricingTable};
pub use diagnostics::{
    CacheEfficiency, CategoryCost, CompactionEvent, ContextAnalysis, ContextPoint, CostCategory,
    DiagnosticReport, DiagnosticsConfig, ExpensiveTurn, FileAccess, ToolCount, analyze,
};
pub use enrich::enrich_transcript;
pub use recommendations::{
    Recommendation, RecommendationThresholds, RuleKind, Severity, recommend,
};
pub use work_blocks::{IDLE_GAP_SECS, segment_work_blocks, total_active_seconds};
