use aide_types::ToolKind;
use serde_json::Value;

/// Tool name with its semantic kind
struct ToolSpec {
    name: &'static str,
    kind: ToolKind,
}

impl ToolSpec {
    const fn new(name: &'static str, kind: ToolKind) -> Self {
        Self { name, kind }
    }
}

/// Registry of Claude Code tools
const CLAUDE_TOOLS: &[ToolSpec] = &[
    // Ask tools
    ToolSpec::new("AskUserQuestion", ToolKind::Ask),
    // Execute tools
    ToolSpec::new("Bash", ToolKind::Execute),
    ToolSpec::new("BashOutput", ToolKind::Execute),
    ToolSpec::new("KillShell", ToolKind::Execute),
    ToolSpec::new("KillBash", ToolKind::Execute),
    ToolSpec::new("Skill", ToolKind::Execute),
    ToolSpec::new("SlashCommand", ToolKind::Execute),
    // Edit tools
    ToolSpec::new("Edit", ToolKind::Edit),
    ToolSpec::new("MultiEdit", ToolKind::Edit),
    ToolSpec::new("NotebookEdit", ToolKind::Edit),
    // Write tools
    ToolSpec::new("Write", ToolKind::Write),
    // Read tools
    ToolSpec::new("Read", ToolKind::Read),
    ToolSpec::new("NotebookRead", ToolKind::Read),
    // Search tools
    ToolSpec::new("Glob", ToolKind::Search),
    ToolSpec::new("Grep", ToolKind::Search),
    ToolSpec::new("LS", ToolKind::Search),
    // Web tools
    ToolSpec::new("WebFetch", ToolKind::Web),
    ToolSpec::new("WebSearch", ToolKind::Web),
    // Plan tools
    ToolSpec::new("Task", ToolKind::Plan),
    ToolSpec::new("Agent", ToolKind::Plan),
    ToolSpec::new("TaskCreate", ToolKind::Plan),
    ToolSpec::new("TaskUpdate", ToolKind::Plan),
    ToolSpec::new("TaskGet", ToolKind::Plan),
    ToolSpec::new("TaskList", ToolKind::Plan),
    ToolSpec::new("TaskStop", ToolKind::Plan),
    ToolSpec::new("TaskOutput", ToolKind::Plan),
    ToolSpec::new("SendMessage", ToolKind::Plan),
    ToolSpec::new("TodoWrite", ToolKind::Plan),
    ToolSpec::new("EnterPlanMode", ToolKind::Plan),
    ToolSpec::new("ExitPlanMode", ToolKind::Plan),
];

/// Classify a Claude Code tool name. Total: unknown and MCP tools are `Other`.
pub fn classify_tool(tool_name: &str) -> ToolKind {
    CLAUDE_TOOLS
        .iter()
        .find(|t| t.name == tool_name)
        .map(|spec| spec.kind)
        .unwrap_or(ToolKind::Other)
}

/// Target file of a tool invocation, if its arguments name one.
pub fn extract_target_path(arguments: &Value) -> Option<String> {
    ["file_path", "notebook_path"]
        .iter()
        .find_map(|key| arguments.get(key).and_then(|v| v.as_str()))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
