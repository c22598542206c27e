use aide_types::{ToolCall, ToolKind};
use rusqlite::{Connection, params};

use super::{fmt_ts, get_u64, parse_ts, to_i64};
use crate::Result;
use crate::records::ToolUsage;

pub fn insert(
    conn: &Connection,
    session_id: &str,
    source_file: &str,
    turn_index: u64,
    call: &ToolCall,
) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT INTO tool_calls (session_id, source_file, turn_index, tool_use_id, tool_name,
                                kind, file_path, is_error, timestamp)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            session_id,
            source_file,
            to_i64(turn_index),
            &call.tool_use_id,
            &call.tool_name,
            call.kind.as_str(),
            &call.file_path,
            call.is_error,
            fmt_ts(&call.timestamp),
        ],
    )?;
    Ok(())
}

pub fn delete_by_file(conn: &Connection, source_file: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM tool_calls WHERE source_file = ?1", [source_file])
}

/// Tool calls of a session keyed by (source file, turn index) of their message.
pub fn list_for_session(
    conn: &Connection,
    session_id: &str,
) -> Result<Vec<(String, u64, ToolCall)>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT source_file, turn_index, tool_use_id, tool_name, kind, file_path, is_error, timestamp
        FROM tool_calls
        WHERE session_id = ?1
        ORDER BY source_file, turn_index, rowid
        "#,
    )?;

    let rows = stmt.query_map([session_id], |row| {
        let kind: String = row.get(4)?;
        Ok((
            row.get::<_, String>(0)?,
            get_u64(row, 1)?,
            ToolCall {
                tool_use_id: row.get(2)?,
                tool_name: row.get(3)?,
                kind: ToolKind::parse(&kind).unwrap_or(ToolKind::Other),
                file_path: row.get(5)?,
                is_error: row.get(6)?,
                timestamp: parse_ts(7, &row.get::<_, String>(7)?)?,
            },
        ))
    })?;

    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Calls per tool name for a session, most used first.
pub fn usage_for_session(conn: &Connection, session_id: &str) -> Result<Vec<ToolUsage>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT tool_name, COUNT(*), SUM(is_error)
        FROM tool_calls
        WHERE session_id = ?1
        GROUP BY tool_name
        ORDER BY COUNT(*) DESC, tool_name
        "#,
    )?;

    let rows = stmt.query_map([session_id], |row| {
        Ok(ToolUsage {
            tool_name: row.get(0)?,
            count: get_u64(row, 1)?,
            error_count: get_u64(row, 2)?,
        })
    })?;

    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
