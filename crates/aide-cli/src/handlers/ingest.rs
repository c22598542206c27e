use crate::presentation::{Palette, ingest::format_summary};
use aide_index::Database;
use aide_runtime::{Config, IngestMode, IngestProgress, IngestService};
use anyhow::{Context, Result};

pub fn handle(
    config: &Config,
    full: bool,
    verbose: bool,
    json: bool,
    palette: &Palette,
) -> Result<()> {
    let mut db = Database::open(&config.db_path)
        .with_context(|| format!("failed to open store at {}", config.db_path.display()))?;

    let mode = if full {
        IngestMode::Full
    } else {
        IngestMode::Incremental
    };

    let summary = IngestService::new(&mut db, config).run(mode, |event| {
        if !verbose {
            return;
        }
        match event {
            IngestProgress::LogRootMissing { log_root } => {
                eprintln!("log directory not found: {}", log_root.display())
            }
            IngestProgress::Discovered { files } => eprintln!("found {} log files", files),
            IngestProgress::FileUnchanged { path } => eprintln!("  unchanged  {}", path),
            IngestProgress::FileIngested {
                path,
                sessions,
                skipped_lines,
            } => eprintln!(
                "  ingested   {} ({} sessions, {} skipped lines)",
                path, sessions, skipped_lines
            ),
            IngestProgress::FileMalformed { path, reason } => {
                eprintln!("  malformed  {} ({})", path, reason)
            }
            IngestProgress::FileForgotten { path } => eprintln!("  forgotten  {}", path),
            IngestProgress::Completed(_) => {}
        }
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", format_summary(&summary, palette));
    }

    Ok(())
}
