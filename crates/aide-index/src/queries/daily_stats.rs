use aide_types::{DailyKey, DailyStat, TokenUsage};
use rusqlite::{Connection, params};
use std::collections::{BTreeMap, BTreeSet};

use super::{fmt_date, get_u64, parse_date, parse_ts, to_i64};
use crate::Result;

/// Project name carried by the per-date totals across all projects.
pub const ALL_PROJECTS: &str = "*";

/// Recompute rollups from session rows.
///
/// With `keys` set, only those (date, project) pairs are returned.
pub fn compute(
    conn: &Connection,
    keys: Option<&BTreeSet<DailyKey>>,
) -> rusqlite::Result<Vec<DailyStat>> {
    fold_sessions(conn, |key| keys.is_none_or(|k| k.contains(&key)).then_some(key))
}

/// Per-date totals across every project. Never stored.
pub fn totals(conn: &Connection) -> rusqlite::Result<Vec<DailyStat>> {
    fold_sessions(conn, |key| {
        Some(DailyKey {
            date: key.date,
            project_name: ALL_PROJECTS.to_string(),
        })
    })
}

/// This is the only place a `DailyStat` is derived: rows are folded in a
/// fixed order so recomputing always yields bit-identical sums. `group` maps a
/// session's (date, project) key to its rollup key, or drops the row.
fn fold_sessions<G>(conn: &Connection, group: G) -> rusqlite::Result<Vec<DailyStat>>
where
    G: Fn(DailyKey) -> Option<DailyKey>,
{
    let mut stmt = conn.prepare(
        r#"
        SELECT session_id, project_name, started_at, message_count, tool_call_count,
               input_tokens, output_tokens, cache_write_tokens, cache_read_tokens,
               estimated_cost_usd, active_duration_seconds
        FROM sessions
        ORDER BY started_at, session_id, source_file
        "#,
    )?;

    let mut rollups: BTreeMap<DailyKey, (BTreeSet<String>, DailyStat)> = BTreeMap::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let session_id: String = row.get(0)?;
        let project_name: String = row.get(1)?;
        let date = parse_ts(2, &row.get::<_, String>(2)?)?.date_naive();
        let Some(key) = group(DailyKey { date, project_name }) else {
            continue;
        };

        let (sessions, stat) = rollups.entry(key.clone()).or_insert_with(|| {
            (
                BTreeSet::new(),
                DailyStat {
                    date: key.date,
                    project_name: key.project_name,
                    session_count: 0,
                    message_count: 0,
                    tool_call_count: 0,
                    usage: TokenUsage::default(),
                    estimated_cost_usd: 0.0,
                    active_seconds: 0,
                },
            )
        });
        sessions.insert(session_id);
        stat.session_count = sessions.len() as u64;
        stat.message_count += get_u64(row, 3)?;
        stat.tool_call_count += get_u64(row, 4)?;
        stat.usage += TokenUsage::new(
            get_u64(row, 5)?,
            get_u64(row, 6)?,
            get_u64(row, 7)?,
            get_u64(row, 8)?,
        );
        stat.estimated_cost_usd += row.get::<_, f64>(9)?;
        stat.active_seconds += row.get::<_, i64>(10)?;
    }

    Ok(rollups.into_values().map(|(_, stat)| stat).collect())
}

/// Replace stored rollups: all of them, or only `keys`.
///
/// Keys with no remaining sessions end up with no row.
pub fn replace(
    conn: &Connection,
    keys: Option<&BTreeSet<DailyKey>>,
    stats: &[DailyStat],
) -> rusqlite::Result<()> {
    match keys {
        None => {
            conn.execute("DELETE FROM daily_stats", [])?;
        }
        Some(keys) => {
            let mut stmt =
                conn.prepare("DELETE FROM daily_stats WHERE date = ?1 AND project_name = ?2")?;
            for key in keys {
                stmt.execute(params![fmt_date(&key.date), &key.project_name])?;
            }
        }
    }

    let mut insert = conn.prepare(
        r#"
        INSERT INTO daily_stats (date, project_name, session_count, message_count,
                                 tool_call_count, input_tokens, output_tokens,
                                 cache_write_tokens, cache_read_tokens, estimated_cost_usd,
                                 active_seconds)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )?;
    for stat in stats {
        insert.execute(params![
            fmt_date(&stat.date),
            &stat.project_name,
            to_i64(stat.session_count),
            to_i64(stat.message_count),
            to_i64(stat.tool_call_count),
            to_i64(stat.usage.input_tokens),
            to_i64(stat.usage.output_tokens),
            to_i64(stat.usage.cache_write_tokens),
            to_i64(stat.usage.cache_read_tokens),
            stat.estimated_cost_usd,
            stat.active_seconds,
        ])?;
    }

    Ok(())
}

pub fn list(conn: &Connection, project_name: Option<&str>) -> Result<Vec<DailyStat>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT date, project_name, session_count, message_count, tool_call_count,
               input_tokens, output_tokens, cache_write_tokens, cache_read_tokens,
               estimated_cost_usd, active_seconds
        FROM daily_stats
        WHERE (?1 IS NULL OR project_name = ?1)
        ORDER BY date, project_name
        "#,
    )?;

    let rows = stmt.query_map([project_name], |row| {
        Ok(DailyStat {
            date: parse_date(0, &row.get::<_, String>(0)?)?,
            project_name: row.get(1)?,
            session_count: get_u64(row, 2)?,
            message_count: get_u64(row, 3)?,
            tool_call_count: get_u64(row, 4)?,
            usage: TokenUsage::new(
                get_u64(row, 5)?,
                get_u64(row, 6)?,
                get_u64(row, 7)?,
                get_u64(row, 8)?,
            ),
            estimated_cost_usd: row.get(9)?,
            active_seconds: row.get(10)?,
        })
    })?;

    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
