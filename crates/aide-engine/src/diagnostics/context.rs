use aide_types::{Message, Role};
use serde::{Deserialize, Serialize};

/// Context size seen by one API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPoint {
    pub turn_index: u64,
    pub context_tokens: u64,
}

/// Sharp drop in context size between two consecutive API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactionEvent {
    /// Curve index of the call after the drop.
    pub curve_index: usize,
    pub turn_index: u64,
    pub tokens_before: u64,
    pub tokens_after: u64,
    pub estimated_tokens_lost: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextAnalysis {
    pub curve: Vec<ContextPoint>,
    pub peak_tokens: u64,
    /// `peak_tokens / context_window`
    pub peak_utilization: f64,
    pub mean_tokens: f64,
    pub compactions: Vec<CompactionEvent>,
}

/// One point per assistant API call, in message order.
pub fn context_curve(messages: &[Message]) -> Vec<ContextPoint> {
    messages
        .iter()
        .filter(|m| m.role == Role::Assistant && m.is_api_call)
        .map(|m| ContextPoint {
            turn_index: m.turn_index,
            context_tokens: m.usage.context_tokens(),
        })
        .collect()
}

/// Flag every drop where `(prev - cur) / prev` exceeds `drop_fraction`.
pub fn detect_compactions(curve: &[ContextPoint], drop_fraction: f64) -> Vec<CompactionEvent> {
    curve
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let (prev, cur) = (pair[0].context_tokens, pair[1].context_tokens);
            if prev == 0 || cur >= prev {
                return None;
            }
            let lost = prev - cur;
            (lost as f64 / prev as f64 > drop_fraction).then_some(CompactionEvent {
                curve_index: i + 1,
                turn_index: pair[1].turn_index,
                tokens_before: prev,
                tokens_after: cur,
                estimated_tokens_lost: lost,
            })
        })
        .collect()
}

pub fn analyze_context(
    messages: &[Message],
    context_window: u64,
    drop_fraction: f64,
) -> ContextAnalysis {
    let curve = context_curve(messages);
    let peak_tokens = curve.iter().map(|p| p.context_tokens).max().unwrap_or(0);
    let peak_utilization = if context_window == 0 {
        0.0
    } else {
        peak_tokens as f64 / context_window as f64
    };
    let mean_tokens = if curve.is_empty() {
        0.0
    } else {
        curve.iter().map(|p| p.context_tokens as f64).sum::<f64>() / curve.len() as f64
    };
    let compactions = detect_compactions(&curve, drop_fraction);

    ContextAnalysis {
        curve,
        peak_tokens,
        peak_utilization,
        mean_tokens,
        compactions,
    }
}
