// Error types
pub mod error;

// Claude Code JSONL logs
pub mod claude;

// Project identity from log directory names
pub mod project;

pub use claude::discovery::discover_log_files;
pub use claude::io::{parse_file, parse_str};
pub use claude::parser::{ParseOutcome, RejectedSession};
pub use claude::tool_mapping::{classify_tool, extract_target_path};
pub use error::{Error, Result};
pub use project::{derive_project_name, project_dir_name};
