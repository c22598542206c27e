use aide_types::WorkBlock;
use rusqlite::{Connection, params};

use super::{fmt_ts, get_u64, parse_ts, to_i64};
use crate::Result;

pub fn insert(
    conn: &Connection,
    session_id: &str,
    source_file: &str,
    block: &WorkBlock,
) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT INTO work_blocks (session_id, source_file, block_index, started_at, ended_at,
                                 active_seconds, message_count)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            session_id,
            source_file,
            to_i64(block.index),
            fmt_ts(&block.started_at),
            fmt_ts(&block.ended_at),
            block.active_seconds,
            to_i64(block.message_count),
        ],
    )?;
    Ok(())
}

pub fn delete_by_file(conn: &Connection, source_file: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM work_blocks WHERE source_file = ?1", [source_file])
}

/// Blocks of every fragment of a session, re-indexed in chronological order.
pub fn list_for_session(conn: &Connection, session_id: &str) -> Result<Vec<WorkBlock>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT started_at, ended_at, active_seconds, message_count
        FROM work_blocks
        WHERE session_id = ?1
        ORDER BY started_at, source_file, block_index
        "#,
    )?;

    let rows = stmt.query_map([session_id], |row| {
        Ok(WorkBlock {
            index: 0,
            started_at: parse_ts(0, &row.get::<_, String>(0)?)?,
            ended_at: parse_ts(1, &row.get::<_, String>(1)?)?,
            active_seconds: row.get(2)?,
            message_count: get_u64(row, 3)?,
        })
    })?;

    let mut blocks = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    for (i, block) in blocks.iter_mut().enumerate() {
        block.index = i as u64;
    }
    Ok(blocks)
}
