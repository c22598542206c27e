use aide_types::{Message, ToolKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How often one target path was touched by tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAccess {
    pub path: String,
    pub reads: u64,
    pub edits: u64,
    pub writes: u64,
    pub total: u64,
}

/// Per-path access counts, most-touched first (ties by path).
pub fn file_access_counts(messages: &[Message]) -> Vec<FileAccess> {
    let mut by_path: HashMap<&str, FileAccess> = HashMap::new();

    for call in messages.iter().flat_map(|m| &m.tool_calls) {
        let Some(path) = call.file_path.as_deref() else {
            continue;
        };
        let entry = by_path.entry(path).or_insert_with(|| FileAccess {
            path: path.to_string(),
            reads: 0,
            edits: 0,
            writes: 0,
            total: 0,
        });
        match call.kind {
            ToolKind::Read | ToolKind::Search => entry.reads += 1,
            ToolKind::Edit => entry.edits += 1,
            ToolKind::Write => entry.writes += 1,
            _ => continue,
        }
        entry.total += 1;
    }

    let mut files: Vec<FileAccess> = by_path.into_values().filter(|f| f.total > 0).collect();
    files.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.path.cmp(&b.path)));
    files
}
