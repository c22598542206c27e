use aide_types::{Message, Role, TokenUsage, ToolKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a priced event's cost is attributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    FileReads,
    CodeGeneration,
    Execution,
    Orchestration,
    Overhead,
}

impl CostCategory {
    pub const ALL: [CostCategory; 5] = [
        CostCategory::FileReads,
        CostCategory::CodeGeneration,
        CostCategory::Execution,
        CostCategory::Orchestration,
        CostCategory::Overhead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CostCategory::FileReads => "file_reads",
            CostCategory::CodeGeneration => "code_generation",
            CostCategory::Execution => "execution",
            CostCategory::Orchestration => "orchestration",
            CostCategory::Overhead => "overhead",
        }
    }

    /// Category of a message whose first tool call has this kind.
    pub fn for_tool(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Read | ToolKind::Search => CostCategory::FileReads,
            ToolKind::Edit | ToolKind::Write => CostCategory::CodeGeneration,
            ToolKind::Execute => CostCategory::Execution,
            ToolKind::Plan | ToolKind::Ask | ToolKind::Web | ToolKind::Other => {
                CostCategory::Orchestration
            }
        }
    }
}

/// Totals for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCost {
    pub category: CostCategory,
    pub usage: TokenUsage,
    pub cost_usd: f64,
    /// Share of the session's total cost, 0-100.
    pub percentage: f64,
}

/// Assign every message exactly one category, index-aligned with `messages`.
///
/// Fragments of one API call share a category, decided by the first tool
/// call across all of them. The fragment carrying the call's usage is often
/// a text or thinking line written before the `tool_use` line.
///
/// Tool-less assistant output counts as code generation when its run of
/// tool-less assistant messages leads straight into a code edit.
pub fn categorize(messages: &[Message]) -> Vec<CostCategory> {
    let mut call_tools: HashMap<&str, ToolKind> = HashMap::new();
    for message in messages {
        if let (Some(call_id), Some(call)) = (message.api_call_id.as_deref(), message.first_tool())
        {
            call_tools.entry(call_id).or_insert(call.kind);
        }
    }

    let mut categories = vec![CostCategory::Overhead; messages.len()];
    let mut leads_into_edit = false;

    for (i, message) in messages.iter().enumerate().rev() {
        categories[i] = match message.role {
            Role::User | Role::System => {
                leads_into_edit = false;
                CostCategory::Overhead
            }
            Role::Assistant => {
                let tool = message
                    .api_call_id
                    .as_deref()
                    .and_then(|id| call_tools.get(id).copied())
                    .or_else(|| message.first_tool().map(|call| call.kind));
                match tool {
                    Some(kind) => {
                        leads_into_edit = kind.is_code_edit();
                        CostCategory::for_tool(kind)
                    }
                    None if leads_into_edit => CostCategory::CodeGeneration,
                    None => CostCategory::Overhead,
                }
            }
        };
    }

    categories
}

/// Sum usage and cost per category. All five categories are always present.
///
/// `costs` is index-aligned with `messages`.
pub fn cost_by_category(messages: &[Message], costs: &[f64]) -> Vec<CategoryCost> {
    let categories = categorize(messages);
    let mut totals: Vec<CategoryCost> = CostCategory::ALL
        .iter()
        .map(|&category| CategoryCost {
            category,
            usage: TokenUsage::default(),
            cost_usd: 0.0,
            percentage: 0.0,
        })
        .collect();

    for ((message, category), cost) in messages.iter().zip(&categories).zip(costs) {
        if let Some(slot) = totals.iter_mut().find(|t| t.category == *category) {
            slot.usage += message.usage;
            slot.cost_usd += cost;
        }
    }

    let total: f64 = totals.iter().map(|t| t.cost_usd).sum();
    if total > 0.0 {
        for slot in &mut totals {
            slot.percentage = slot.cost_usd / total * 100.0;
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::test_support::{api_call, assistant, assistant_with_tool, user};

    #[test]
    fn test_first_tool_decides_category() {
        let messages = vec![
            assistant_with_tool(0, "Read", ToolKind::Read),
            assistant_with_tool(1, "Bash", ToolKind::Execute),
            assistant_with_tool(2, "WebFetch", ToolKind::Web),
            assistant_with_tool(3, "mcp__db__query", ToolKind::Other),
        ];
        assert_eq!(
            categorize(&messages),
            vec![
                CostCategory::FileReads,
                CostCategory::Execution,
                CostCategory::Orchestration,
                CostCategory::Orchestration,
            ]
        );
    }

    #[test]
    fn test_reasoning_before_edit_is_code_generation() {
        let messages = vec![
            user(0),
            assistant(1),
            assistant(2),
            assistant_with_tool(3, "Edit", ToolKind::Edit),
            user(4),
            assistant(5),
            assistant_with_tool(6, "Grep", ToolKind::Search),
            assistant(7),
        ];
        assert_eq!(
            categorize(&messages),
            vec![
                CostCategory::Overhead,
                CostCategory::CodeGeneration,
                CostCategory::CodeGeneration,
                CostCategory::CodeGeneration,
                CostCategory::Overhead,
                CostCategory::Overhead,
                CostCategory::FileReads,
                CostCategory::Overhead,
            ]
        );
    }

    #[test]
    fn test_user_message_breaks_the_run() {
        let messages = vec![
            assistant(0),
            user(1),
            assistant_with_tool(2, "Write", ToolKind::Write),
        ];
        assert_eq!(categorize(&messages)[0], CostCategory::Overhead);
    }

    #[test]
    fn test_cost_by_category_is_exhaustive() {
        let messages = vec![
            user(0),
            assistant(1),
            assistant_with_tool(2, "Write", ToolKind::Write),
            assistant_with_tool(3, "Read", ToolKind::Read),
        ];
        let costs = [0.0, 1.0, 2.0, 1.0];
        let totals = cost_by_category(&messages, &costs);

        assert_eq!(totals.len(), 5);
        let sum: f64 = totals.iter().map(|t| t.cost_usd).sum();
        assert_eq!(sum, 4.0);
        assert_eq!(totals[1].category, CostCategory::CodeGeneration);
        assert_eq!(totals[1].cost_usd, 3.0);
        assert_eq!(totals[1].percentage, 75.0);
        assert_eq!(totals[2].cost_usd, 0.0);
    }

    fn fragment(mut message: Message, call_id: &str) -> Message {
        message.api_call_id = Some(call_id.to_string());
        message
    }

    #[test]
    fn test_fragments_of_one_call_share_the_tool_category() {
        // Usage rides on the leading text fragment, the tool on the next one
        let messages = vec![
            user(0),
            api_call(1, 1_000_000, 0, 0),
            fragment(assistant_with_tool(2, "Read", ToolKind::Read), "msg_1"),
            user(3),
            fragment(api_call(4, 500, 0, 0), "msg_b"),
            fragment(assistant_with_tool(5, "Bash", ToolKind::Execute), "msg_b"),
            fragment(assistant_with_tool(6, "Edit", ToolKind::Edit), "msg_b"),
        ];
        assert_eq!(
            categorize(&messages),
            vec![
                CostCategory::Overhead,
                CostCategory::FileReads,
                CostCategory::FileReads,
                CostCategory::Overhead,
                CostCategory::Execution,
                CostCategory::Execution,
                CostCategory::Execution,
            ]
        );

        let costs = [0.0, 3.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let totals = cost_by_category(&messages, &costs);
        assert_eq!(totals[0].category, CostCategory::FileReads);
        assert_eq!(totals[0].cost_usd, 3.0);
        assert_eq!(totals[0].usage.input_tokens, 1_000_000);
        assert_eq!(totals[2].cost_usd, 1.0);
        assert_eq!(totals[4].cost_usd, 0.0);
    }

    #[test]
    fn test_tool_less_call_before_edit_stays_code_generation() {
        let messages = vec![
            user(0),
            api_call(1, 100, 0, 0),
            fragment(api_call(2, 100, 0, 0), "msg_2"),
            fragment(assistant_with_tool(3, "Write", ToolKind::Write), "msg_3"),
        ];
        assert_eq!(
            categorize(&messages),
            vec![
                CostCategory::Overhead,
                CostCategory::CodeGeneration,
                CostCategory::CodeGeneration,
                CostCategory::CodeGeneration,
            ]
        );
    }
}
