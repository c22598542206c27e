use crate::presentation::{Palette, diagnose::format_diagnosis};
use aide_index::Database;
use aide_runtime::{Config, diagnose};
use anyhow::{Result, bail};

pub fn handle(config: &Config, session_id: &str, json: bool, palette: &Palette) -> Result<()> {
    if !config.db_path.exists() {
        bail!(
            "no store at {}; run `aide ingest` first",
            config.db_path.display()
        );
    }

    let db = Database::open_read_only(&config.db_path)?;
    let diagnosis = diagnose(&db, session_id, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnosis)?);
    } else {
        print!("{}", format_diagnosis(&diagnosis, palette));
    }

    Ok(())
}
