use rusqlite::Connection;

use crate::{Error, Result};

// Schema version (increment when adding tables or columns)
pub const SCHEMA_VERSION: i32 = 2;

// Derived tables, in child-to-parent order for deletes.
pub(crate) const DERIVED_TABLES: &[&str] = &[
    "tool_calls",
    "messages",
    "work_blocks",
    "sessions",
    "daily_stats",
    "ingest_log",
];

const CREATE_TABLES: &str = r#"
    CREATE TABLE IF NOT EXISTS sessions (
        session_id TEXT NOT NULL,
        source_file TEXT NOT NULL,
        project_path TEXT NOT NULL,
        project_name TEXT NOT NULL,
        started_at TEXT NOT NULL,
        ended_at TEXT NOT NULL,
        duration_seconds INTEGER NOT NULL DEFAULT 0,
        active_duration_seconds INTEGER NOT NULL DEFAULT 0,
        input_tokens INTEGER NOT NULL DEFAULT 0,
        output_tokens INTEGER NOT NULL DEFAULT 0,
        cache_write_tokens INTEGER NOT NULL DEFAULT 0,
        cache_read_tokens INTEGER NOT NULL DEFAULT 0,
        estimated_cost_usd REAL NOT NULL DEFAULT 0,
        message_count INTEGER NOT NULL DEFAULT 0,
        user_message_count INTEGER NOT NULL DEFAULT 0,
        assistant_message_count INTEGER NOT NULL DEFAULT 0,
        tool_call_count INTEGER NOT NULL DEFAULT 0,
        read_count INTEGER NOT NULL DEFAULT 0,
        write_count INTEGER NOT NULL DEFAULT 0,
        edit_count INTEGER NOT NULL DEFAULT 0,
        command_count INTEGER NOT NULL DEFAULT 0,
        compaction_count INTEGER NOT NULL DEFAULT 0,
        peak_context_tokens INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (session_id, source_file)
    );

    CREATE TABLE IF NOT EXISTS messages (
        session_id TEXT NOT NULL,
        source_file TEXT NOT NULL,
        uuid TEXT NOT NULL,
        parent_uuid TEXT,
        turn_index INTEGER NOT NULL,
        role TEXT NOT NULL,
        content_kind TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        model TEXT,
        api_call_id TEXT,
        is_api_call INTEGER NOT NULL DEFAULT 0,
        input_tokens INTEGER NOT NULL DEFAULT 0,
        output_tokens INTEGER NOT NULL DEFAULT 0,
        cache_write_tokens INTEGER NOT NULL DEFAULT 0,
        cache_read_tokens INTEGER NOT NULL DEFAULT 0,
        cost_usd REAL NOT NULL DEFAULT 0,
        content_length INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (session_id, source_file)
            REFERENCES sessions(session_id, source_file) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS tool_calls (
        session_id TEXT NOT NULL,
        source_file TEXT NOT NULL,
        turn_index INTEGER NOT NULL,
        tool_use_id TEXT NOT NULL,
        tool_name TEXT NOT NULL,
        kind TEXT NOT NULL,
        file_path TEXT,
        is_error INTEGER NOT NULL DEFAULT 0,
        timestamp TEXT NOT NULL,
        FOREIGN KEY (session_id, source_file)
            REFERENCES sessions(session_id, source_file) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS work_blocks (
        session_id TEXT NOT NULL,
        source_file TEXT NOT NULL,
        block_index INTEGER NOT NULL,
        started_at TEXT NOT NULL,
        ended_at TEXT NOT NULL,
        active_seconds INTEGER NOT NULL,
        message_count INTEGER NOT NULL,
        FOREIGN KEY (session_id, source_file)
            REFERENCES sessions(session_id, source_file) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS daily_stats (
        date TEXT NOT NULL,
        project_name TEXT NOT NULL,
        session_count INTEGER NOT NULL,
        message_count INTEGER NOT NULL,
        tool_call_count INTEGER NOT NULL,
        input_tokens INTEGER NOT NULL,
        output_tokens INTEGER NOT NULL,
        cache_write_tokens INTEGER NOT NULL,
        cache_read_tokens INTEGER NOT NULL,
        estimated_cost_usd REAL NOT NULL,
        active_seconds INTEGER NOT NULL,
        PRIMARY KEY (date, project_name)
    );

    CREATE TABLE IF NOT EXISTS ingest_log (
        source_file TEXT PRIMARY KEY,
        file_size INTEGER NOT NULL,
        mtime_ns INTEGER NOT NULL,
        status TEXT NOT NULL,
        session_count INTEGER NOT NULL DEFAULT 0,
        skipped_lines INTEGER NOT NULL DEFAULT 0,
        ingested_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_sessions_source ON sessions(source_file);
    CREATE INDEX IF NOT EXISTS idx_sessions_project ON sessions(project_name);
    CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, source_file);
    CREATE INDEX IF NOT EXISTS idx_tool_calls_session ON tool_calls(session_id, source_file);
    CREATE INDEX IF NOT EXISTS idx_work_blocks_session ON work_blocks(session_id, source_file);
"#;

/// Columns added after version 1: (table, column, declaration).
const ADDED_COLUMNS: &[(&str, &str, &str)] = &[
    ("sessions", "compaction_count", "INTEGER NOT NULL DEFAULT 0"),
    ("sessions", "peak_context_tokens", "INTEGER NOT NULL DEFAULT 0"),
    ("ingest_log", "skipped_lines", "INTEGER NOT NULL DEFAULT 0"),
];

/// Create missing tables and bring older stores up to date.
///
/// Migrations only add; a store written by a newer build is refused.
pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version > SCHEMA_VERSION {
        return Err(Error::Query(format!(
            "database schema version {} is newer than supported version {}",
            current_version, SCHEMA_VERSION
        )));
    }

    conn.execute_batch(CREATE_TABLES)?;

    if current_version < SCHEMA_VERSION {
        for (table, column, decl) in ADDED_COLUMNS {
            if !has_column(conn, table, column)? {
                tracing::info!(table, column, "adding column");
                conn.execute(
                    &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, decl),
                    [],
                )?;
            }
        }
    }

    conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;

    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(has_column(&conn, "sessions", "peak_context_tokens").unwrap());
    }

    #[test]
    fn test_newer_store_is_refused() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION + 1), [])
            .unwrap();
        assert!(matches!(init_schema(&conn), Err(Error::Query(_))));
    }
}
