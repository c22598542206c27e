use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SUBAGENTS_DIR: &str = "subagents";

fn is_session_log(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "jsonl")
}

fn is_subagent_path(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .any(|c| c.as_os_str() == SUBAGENTS_DIR)
}

/// Find every session log under `log_root`, sorted by path.
///
/// Subagent transcripts are excluded: their usage is already reported by
/// the parent session. A missing root yields an empty list.
pub fn discover_log_files(log_root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(log_root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_session_log(p) && !is_subagent_path(p, log_root))
        .collect();

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discovers_jsonl_sorted_without_subagents() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("-Users-a-projects-web/subagents")).unwrap();
        fs::create_dir_all(root.join("-Users-a-projects-api")).unwrap();
        fs::write(root.join("-Users-a-projects-web/b.jsonl"), "").unwrap();
        fs::write(root.join("-Users-a-projects-web/a.jsonl"), "").unwrap();
        fs::write(root.join("-Users-a-projects-web/notes.txt"), "").unwrap();
        fs::write(root.join("-Users-a-projects-web/subagents/agent-1.jsonl"), "").unwrap();
        fs::write(root.join("-Users-a-projects-api/c.jsonl"), "").unwrap();

        let files = discover_log_files(root);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            vec![
                "-Users-a-projects-api/c.jsonl",
                "-Users-a-projects-web/a.jsonl",
                "-Users-a-projects-web/b.jsonl",
            ]
        );
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_log_files(&dir.path().join("nope")).is_empty());
    }
}
