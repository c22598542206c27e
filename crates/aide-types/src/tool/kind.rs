use serde::{Deserialize, Serialize};

/// Tool classification by semantic purpose
///
/// The set is closed: every tool name the assistant can emit maps to exactly
/// one kind, with `Other` absorbing anything unrecognised (including MCP tools).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Read a single file's content
    Read,
    /// Search the workspace (glob, grep)
    Search,
    /// Modify an existing file in place
    Edit,
    /// Create or overwrite a file
    Write,
    /// Execute operations (shell commands, scripts)
    Execute,
    /// Planning and delegation (todo, task management, subagents)
    Plan,
    /// Network lookups (web fetch, web search)
    Web,
    /// User interaction (questions, prompts)
    Ask,
    /// Other/unknown operations
    Other,
}

impl ToolKind {
    pub const ALL: [ToolKind; 9] = [
        ToolKind::Read,
        ToolKind::Search,
        ToolKind::Edit,
        ToolKind::Write,
        ToolKind::Execute,
        ToolKind::Plan,
        ToolKind::Web,
        ToolKind::Ask,
        ToolKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Read => "read",
            ToolKind::Search => "search",
            ToolKind::Edit => "edit",
            ToolKind::Write => "write",
            ToolKind::Execute => "execute",
            ToolKind::Plan => "plan",
            ToolKind::Web => "web",
            ToolKind::Ask => "ask",
            ToolKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// True for tools that look at existing file content.
    pub fn is_file_read(&self) -> bool {
        matches!(self, ToolKind::Read | ToolKind::Search)
    }

    /// True for tools that produce or change code on disk.
    pub fn is_code_edit(&self) -> bool {
        matches!(self, ToolKind::Edit | ToolKind::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_round_trips_for_every_kind() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ToolKind::parse("teleport"), None);
    }

    #[test]
    fn test_serde_matches_as_str() {
        let json = serde_json::to_string(&ToolKind::Execute).unwrap();
        assert_eq!(json, "\"execute\"");
    }
}
