use aide_types::{DailyKey, Session, TokenUsage};
use rusqlite::{Connection, Row, params};
use std::collections::{BTreeMap, BTreeSet};

use super::{fmt_ts, get_u64, parse_ts, to_i64};
use crate::Result;
use crate::records::{ProjectTotals, SummaryStats};

const SESSION_COLUMNS: &str = "session_id, source_file, project_path, project_name, started_at, \
    ended_at, duration_seconds, active_duration_seconds, input_tokens, output_tokens, \
    cache_write_tokens, cache_read_tokens, estimated_cost_usd, message_count, \
    user_message_count, assistant_message_count, tool_call_count, read_count, write_count, \
    edit_count, command_count, compaction_count, peak_context_tokens";

pub fn insert(conn: &Connection, s: &Session) -> rusqlite::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO sessions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, \
             ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
            SESSION_COLUMNS
        ),
        params![
            &s.session_id,
            &s.source_file,
            &s.project_path,
            &s.project_name,
            fmt_ts(&s.started_at),
            fmt_ts(&s.ended_at),
            s.duration_seconds,
            s.active_duration_seconds,
            to_i64(s.usage.input_tokens),
            to_i64(s.usage.output_tokens),
            to_i64(s.usage.cache_write_tokens),
            to_i64(s.usage.cache_read_tokens),
            s.estimated_cost_usd,
            to_i64(s.message_count),
            to_i64(s.user_message_count),
            to_i64(s.assistant_message_count),
            to_i64(s.tool_call_count),
            to_i64(s.read_count),
            to_i64(s.write_count),
            to_i64(s.edit_count),
            to_i64(s.command_count),
            to_i64(s.compaction_count),
            to_i64(s.peak_context_tokens),
        ],
    )?;
    Ok(())
}

pub fn delete_by_file(conn: &Connection, source_file: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM sessions WHERE source_file = ?1", [source_file])
}

/// Rollup keys of the sessions currently stored for a file.
pub fn daily_keys_for_file(
    conn: &Connection,
    source_file: &str,
) -> rusqlite::Result<BTreeSet<DailyKey>> {
    let mut stmt =
        conn.prepare("SELECT started_at, project_name FROM sessions WHERE source_file = ?1")?;
    let rows = stmt.query_map([source_file], |row| {
        let started_at = parse_ts(0, &row.get::<_, String>(0)?)?;
        Ok(DailyKey {
            date: started_at.date_naive(),
            project_name: row.get(1)?,
        })
    })?;
    rows.collect()
}

fn from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        session_id: row.get(0)?,
        source_file: row.get(1)?,
        project_path: row.get(2)?,
        project_name: row.get(3)?,
        started_at: parse_ts(4, &row.get::<_, String>(4)?)?,
        ended_at: parse_ts(5, &row.get::<_, String>(5)?)?,
        duration_seconds: row.get(6)?,
        active_duration_seconds: row.get(7)?,
        usage: TokenUsage::new(
            get_u64(row, 8)?,
            get_u64(row, 9)?,
            get_u64(row, 10)?,
            get_u64(row, 11)?,
        ),
        estimated_cost_usd: row.get(12)?,
        message_count: get_u64(row, 13)?,
        user_message_count: get_u64(row, 14)?,
        assistant_message_count: get_u64(row, 15)?,
        tool_call_count: get_u64(row, 16)?,
        read_count: get_u64(row, 17)?,
        write_count: get_u64(row, 18)?,
        edit_count: get_u64(row, 19)?,
        command_count: get_u64(row, 20)?,
        compaction_count: get_u64(row, 21)?,
        peak_context_tokens: get_u64(row, 22)?,
        work_blocks: Vec::new(),
    })
}

/// Every stored fragment of one session, earliest first. Work blocks are not loaded.
pub fn fragments(conn: &Connection, session_id: &str) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM sessions WHERE session_id = ?1 ORDER BY started_at, source_file",
        SESSION_COLUMNS
    ))?;
    let rows = stmt.query_map([session_id], from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// All fragments, optionally for one project, earliest first.
pub fn list_fragments(conn: &Connection, project_name: Option<&str>) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM sessions WHERE (?1 IS NULL OR project_name = ?1) \
         ORDER BY started_at, session_id, source_file",
        SESSION_COLUMNS
    ))?;
    let rows = stmt.query_map([project_name], from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Fold the fragments of a resumed session into one view.
///
/// Identity fields come from the earliest fragment; counters and costs are
/// summed, the time span widened and peaks maximized.
pub fn merge_fragments(fragments: Vec<Session>) -> Option<Session> {
    let mut iter = fragments.into_iter();
    let mut merged = iter.next()?;

    for fragment in iter {
        merged.started_at = merged.started_at.min(fragment.started_at);
        merged.ended_at = merged.ended_at.max(fragment.ended_at);
        merged.active_duration_seconds += fragment.active_duration_seconds;
        merged.usage += fragment.usage;
        merged.estimated_cost_usd += fragment.estimated_cost_usd;
        merged.message_count += fragment.message_count;
        merged.user_message_count += fragment.user_message_count;
        merged.assistant_message_count += fragment.assistant_message_count;
        merged.tool_call_count += fragment.tool_call_count;
        merged.read_count += fragment.read_count;
        merged.write_count += fragment.write_count;
        merged.edit_count += fragment.edit_count;
        merged.command_count += fragment.command_count;
        merged.compaction_count += fragment.compaction_count;
        merged.peak_context_tokens = merged.peak_context_tokens.max(fragment.peak_context_tokens);
    }
    merged.duration_seconds = (merged.ended_at - merged.started_at).num_seconds();

    Some(merged)
}

/// Group fragments by session id, keeping first-appearance order.
pub fn merge_all(fragments: Vec<Session>) -> Vec<Session> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: BTreeMap<String, Vec<Session>> = BTreeMap::new();
    for fragment in fragments {
        if !groups.contains_key(&fragment.session_id) {
            order.push(fragment.session_id.clone());
        }
        groups
            .entry(fragment.session_id.clone())
            .or_default()
            .push(fragment);
    }

    order
        .into_iter()
        .filter_map(|id| groups.remove(&id).and_then(merge_fragments))
        .collect()
}

pub fn summary(conn: &Connection) -> Result<SummaryStats> {
    let (total_sessions, total_messages, total_cost_usd, first, last) = conn.query_row(
        "SELECT COUNT(DISTINCT session_id), COALESCE(SUM(message_count), 0), \
         COALESCE(SUM(estimated_cost_usd), 0.0), MIN(started_at), MAX(started_at) FROM sessions",
        [],
        |row| {
            Ok((
                get_u64(row, 0)?,
                get_u64(row, 1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        },
    )?;

    let mut stmt = conn.prepare(
        "SELECT project_name, COUNT(DISTINCT session_id), SUM(message_count), \
         SUM(estimated_cost_usd), SUM(input_tokens), SUM(output_tokens), \
         SUM(cache_write_tokens), SUM(cache_read_tokens) \
         FROM sessions GROUP BY project_name \
         ORDER BY SUM(estimated_cost_usd) DESC, project_name",
    )?;
    let projects = stmt
        .query_map([], |row| {
            Ok(ProjectTotals {
                project_name: row.get(0)?,
                session_count: get_u64(row, 1)?,
                message_count: get_u64(row, 2)?,
                estimated_cost_usd: row.get(3)?,
                usage: TokenUsage::new(
                    get_u64(row, 4)?,
                    get_u64(row, 5)?,
                    get_u64(row, 6)?,
                    get_u64(row, 7)?,
                ),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let usage = projects
        .iter()
        .fold(TokenUsage::default(), |acc, p| acc + p.usage);
    let first_date = first
        .as_deref()
        .map(|s| parse_ts(3, s))
        .transpose()?
        .map(|ts| ts.date_naive());
    let last_date = last
        .as_deref()
        .map(|s| parse_ts(4, s))
        .transpose()?
        .map(|ts| ts.date_naive());

    Ok(SummaryStats {
        total_sessions,
        total_messages,
        total_cost_usd,
        usage,
        project_count: projects.len() as u64,
        first_date,
        last_date,
        projects,
    })
}
