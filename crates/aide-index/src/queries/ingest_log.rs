use aide_types::{IngestLogEntry, IngestStatus};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{fmt_ts, get_u64, parse_ts, to_i64};
use crate::Result;

pub fn upsert(conn: &Connection, entry: &IngestLogEntry) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT INTO ingest_log (source_file, file_size, mtime_ns, status, session_count,
                                skipped_lines, ingested_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(source_file) DO UPDATE SET
            file_size = ?2,
            mtime_ns = ?3,
            status = ?4,
            session_count = ?5,
            skipped_lines = ?6,
            ingested_at = ?7
        "#,
        params![
            &entry.source_file,
            to_i64(entry.file_size),
            entry.mtime_ns,
            entry.status.as_str(),
            to_i64(entry.session_count),
            to_i64(entry.skipped_lines),
            fmt_ts(&entry.ingested_at),
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, source_file: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM ingest_log WHERE source_file = ?1", [source_file])
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<IngestLogEntry> {
    let status: String = row.get(3)?;
    Ok(IngestLogEntry {
        source_file: row.get(0)?,
        file_size: get_u64(row, 1)?,
        mtime_ns: row.get(2)?,
        status: IngestStatus::parse(&status)
            .ok_or_else(|| rusqlite::Error::InvalidColumnType(3, status.clone(), Type::Text))?,
        session_count: get_u64(row, 4)?,
        skipped_lines: get_u64(row, 5)?,
        ingested_at: parse_ts(6, &row.get::<_, String>(6)?)?,
    })
}

const ENTRY_COLUMNS: &str =
    "source_file, file_size, mtime_ns, status, session_count, skipped_lines, ingested_at";

pub fn get(conn: &Connection, source_file: &str) -> Result<Option<IngestLogEntry>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {} FROM ingest_log WHERE source_file = ?1",
                ENTRY_COLUMNS
            ),
            [source_file],
            from_row,
        )
        .optional()?)
}

pub fn list(conn: &Connection) -> Result<Vec<IngestLogEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM ingest_log ORDER BY source_file",
        ENTRY_COLUMNS
    ))?;
    let rows = stmt.query_map([], from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
