use std::path::Path;

const PROJECTS_MARKER: &str = "-projects-";

/// Derive a human-friendly project name from a Claude project directory name.
///
/// Claude encodes the working directory by joining its components with `-`
/// (`/Users/alice/projects/shop` becomes `-Users-alice-projects-shop`).
/// The name is whatever follows the last `-projects-` marker, else the last
/// dash-separated segment, else the whole input.
pub fn derive_project_name(encoded: &str) -> String {
    if let Some(idx) = encoded.rfind(PROJECTS_MARKER) {
        let name = &encoded[idx + PROJECTS_MARKER.len()..];
        if !name.is_empty() {
            return name.to_string();
        }
    }

    match encoded.rsplit_once('-') {
        Some((_, last)) if !last.is_empty() => last.to_string(),
        _ => encoded.to_string(),
    }
}

/// Name of the directory containing a log file (the encoded project path).
pub fn project_dir_name(log_file: &Path) -> String {
    log_file
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
