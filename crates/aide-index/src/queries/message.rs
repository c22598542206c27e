use aide_types::{ContentKind, Message, Role, TokenUsage};
use rusqlite::types::Type;
use rusqlite::{Connection, params};

use super::{fmt_ts, get_u64, parse_ts, to_i64};
use crate::Result;

pub fn insert(conn: &Connection, source_file: &str, m: &Message) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        INSERT INTO messages (session_id, source_file, uuid, parent_uuid, turn_index, role,
                              content_kind, timestamp, model, api_call_id, is_api_call,
                              input_tokens, output_tokens, cache_write_tokens, cache_read_tokens,
                              cost_usd, content_length)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
        "#,
        params![
            &m.session_id,
            source_file,
            &m.uuid,
            &m.parent_uuid,
            to_i64(m.turn_index),
            m.role.as_str(),
            m.content_kind.as_str(),
            fmt_ts(&m.timestamp),
            &m.model,
            &m.api_call_id,
            m.is_api_call,
            to_i64(m.usage.input_tokens),
            to_i64(m.usage.output_tokens),
            to_i64(m.usage.cache_write_tokens),
            to_i64(m.usage.cache_read_tokens),
            m.cost_usd,
            to_i64(m.content_length),
        ],
    )?;
    Ok(())
}

pub fn delete_by_file(conn: &Connection, source_file: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM messages WHERE source_file = ?1", [source_file])
}

/// Messages of every fragment of a session, paired with their source file.
///
/// Ordered chronologically; ties keep each fragment's own turn order.
pub fn list_for_session(conn: &Connection, session_id: &str) -> Result<Vec<(String, Message)>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT source_file, session_id, uuid, parent_uuid, turn_index, role, content_kind,
               timestamp, model, api_call_id, is_api_call, input_tokens, output_tokens,
               cache_write_tokens, cache_read_tokens, cost_usd, content_length
        FROM messages
        WHERE session_id = ?1
        ORDER BY timestamp, source_file, turn_index
        "#,
    )?;

    let rows = stmt.query_map([session_id], |row| {
        let role: String = row.get(5)?;
        let content_kind: String = row.get(6)?;
        let message = Message {
            session_id: row.get(1)?,
            uuid: row.get(2)?,
            parent_uuid: row.get(3)?,
            turn_index: get_u64(row, 4)?,
            role: Role::parse(&role)
                .ok_or_else(|| rusqlite::Error::InvalidColumnType(5, role.clone(), Type::Text))?,
            content_kind: ContentKind::parse(&content_kind).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(6, content_kind.clone(), Type::Text)
            })?,
            timestamp: parse_ts(7, &row.get::<_, String>(7)?)?,
            model: row.get(8)?,
            api_call_id: row.get(9)?,
            is_api_call: row.get(10)?,
            usage: TokenUsage::new(
                get_u64(row, 11)?,
                get_u64(row, 12)?,
                get_u64(row, 13)?,
                get_u64(row, 14)?,
            ),
            cost_usd: row.get(15)?,
            content_length: get_u64(row, 16)?,
            tool_calls: Vec::new(),
        };
        Ok((row.get::<_, String>(0)?, message))
    })?;

    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
