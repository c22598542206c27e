use crate::{Error, Result};
use std::path::Path;

use super::parser::{FileParser, ParseOutcome};

/// Parse the content of one Claude Code JSONL log.
///
/// `source` is the file the content came from; its parent directory names
/// the project. Bad lines are counted in the outcome, never returned as errors.
pub fn parse_str(content: &str, source: &Path) -> ParseOutcome {
    let mut parser = FileParser::new(source);
    for (i, line) in content.lines().enumerate() {
        parser.push_line(i + 1, line);
    }
    parser.finish()
}

/// Read and parse one Claude Code JSONL log file.
pub fn parse_file(path: &Path) -> Result<ParseOutcome> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8(bytes).map_err(|err| Error::MalformedInput {
        path: path.to_path_buf(),
        reason: format!("not valid UTF-8: {}", err.utf8_error()),
    })?;

    Ok(parse_str(&content, path))
}
