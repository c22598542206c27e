use aide_types::{Message, Role, TokenUsage};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const TOP_TURNS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensiveTurn {
    pub turn_index: u64,
    pub role: Role,
    pub tool_names: Vec<String>,
    pub usage: TokenUsage,
    pub cost_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCount {
    pub tool_name: String,
    pub count: u64,
}

/// The costliest priced messages, highest first (ties by turn order).
pub fn most_expensive_turns(messages: &[Message], costs: &[f64]) -> Vec<ExpensiveTurn> {
    let mut priced: Vec<(&Message, f64)> = messages
        .iter()
        .zip(costs.iter().copied())
        .filter(|(_, cost)| *cost > 0.0)
        .collect();
    priced.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then_with(|| a.0.turn_index.cmp(&b.0.turn_index))
    });

    priced
        .into_iter()
        .take(TOP_TURNS)
        .map(|(m, cost_usd)| ExpensiveTurn {
            turn_index: m.turn_index,
            role: m.role,
            tool_names: m.tool_calls.iter().map(|c| c.tool_name.clone()).collect(),
            usage: m.usage,
            cost_usd,
        })
        .collect()
}

/// Calls per tool name, most used first.
pub fn tool_breakdown(messages: &[Message]) -> Vec<ToolCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for call in messages.iter().flat_map(|m| &m.tool_calls) {
        *counts.entry(call.tool_name.as_str()).or_default() += 1;
    }

    let mut breakdown: Vec<ToolCount> = counts
        .into_iter()
        .map(|(name, count)| ToolCount {
            tool_name: name.to_string(),
            count,
        })
        .collect();
    breakdown.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tool_name.cmp(&b.tool_name)));
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::test_support::{assistant, assistant_with_tool};
    use aide_types::ToolKind;

    #[test]
    fn test_top_turns_capped_and_ordered() {
        let messages: Vec<Message> = (0..7).map(assistant).collect();
        let costs = [0.1, 0.7, 0.0, 0.7, 0.2, 0.3, 0.05];
        let top = most_expensive_turns(&messages, &costs);

        let order: Vec<u64> = top.iter().map(|t| t.turn_index).collect();
        assert_eq!(order, vec![1, 3, 5, 4, 0]);
    }

    #[test]
    fn test_tool_breakdown() {
        let messages = vec![
            assistant_with_tool(0, "Read", ToolKind::Read),
            assistant_with_tool(1, "Bash", ToolKind::Execute),
            assistant_with_tool(2, "Read", ToolKind::Read),
        ];
        let breakdown = tool_breakdown(&messages);
        assert_eq!(breakdown[0], ToolCount { tool_name: "Read".into(), count: 2 });
        assert_eq!(breakdown[1], ToolCount { tool_name: "Bash".into(), count: 1 });
    }
}
