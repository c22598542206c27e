/// Result type for aide-index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the index layer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database operation failed
    #[error("{}", describe_database_error(.0))]
    Database(#[from] rusqlite::Error),

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Query-specific error (invalid input, unsupported store, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// The per-file transaction failed; the file's previous rows are intact
    #[error("Storage integrity violation while writing {file}: {source}")]
    StorageIntegrity {
        file: String,
        #[source]
        source: rusqlite::Error,
    },
}

fn describe_database_error(err: &rusqlite::Error) -> String {
    let msg = err.to_string();
    // Detect schema mismatch errors and provide actionable hint
    if msg.contains("no such column") || msg.contains("no such table") {
        format!(
            "Database schema mismatch: {}. Run `aide ingest --full` to rebuild the store.",
            msg
        )
    } else {
        format!("Database error: {}", msg)
    }
}
