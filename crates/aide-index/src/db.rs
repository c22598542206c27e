use aide_types::{
    DailyKey, DailyStat, IngestLogEntry, Message, Session, SessionTranscript, WorkBlock,
};
use rusqlite::{Connection, OpenFlags, Transaction};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::time::Duration;

use crate::queries::{daily_stats, ingest_log, message, session, tool_call, work_block};
use crate::records::{SummaryStats, ToolUsage};
use crate::schema::{self, DERIVED_TABLES, SCHEMA_VERSION};
use crate::{Error, Result};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) a writable store and migrate its schema.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::debug!(path = %db_path.display(), journal_mode = %mode, "opened database");

        Self::prepare(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?)
    }

    /// Open an existing store without write access.
    ///
    /// Readers never see a file's rows half-replaced: writers commit per file.
    pub fn open_read_only(db_path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let version = schema::schema_version(&conn)?;
        if version == 0 {
            return Err(Error::Query(format!(
                "{} has not been initialized; run `aide ingest` first",
                db_path.display()
            )));
        }
        if version > SCHEMA_VERSION {
            return Err(Error::Query(format!(
                "database schema version {} is newer than supported version {}",
                version, SCHEMA_VERSION
            )));
        }

        Ok(Self { conn })
    }

    fn prepare(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    // --- writes -------------------------------------------------------------

    /// Replace everything stored for `source_file` in one transaction.
    ///
    /// Returns the rollup keys touched by either the old or the new rows.
    /// On failure the transaction is rolled back and the file's previous
    /// state is untouched.
    pub fn replace_file(
        &mut self,
        source_file: &str,
        transcripts: &[SessionTranscript],
        entry: &IngestLogEntry,
    ) -> Result<BTreeSet<DailyKey>> {
        let integrity = |source| Error::StorageIntegrity {
            file: source_file.to_string(),
            source,
        };

        let tx = self.conn.transaction().map_err(integrity)?;
        let touched = write_file(&tx, source_file, transcripts, entry).map_err(integrity)?;
        tx.commit().map_err(integrity)?;

        Ok(touched)
    }

    /// Drop every row of a file that no longer exists, ingest-log entry included.
    pub fn forget_file(&mut self, source_file: &str) -> Result<BTreeSet<DailyKey>> {
        let integrity = |source| Error::StorageIntegrity {
            file: source_file.to_string(),
            source,
        };

        let tx = self.conn.transaction().map_err(integrity)?;
        let touched = delete_file_rows(&tx, source_file).map_err(integrity)?;
        ingest_log::delete(&tx, source_file).map_err(integrity)?;
        tx.commit().map_err(integrity)?;

        Ok(touched)
    }

    /// Empty every derived table (full rebuild).
    pub fn truncate_all(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        for table in DERIVED_TABLES {
            tx.execute(&format!("DELETE FROM {}", table), [])?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Recompute rollups for `keys`, or for everything when `None`.
    pub fn rebuild_daily_stats(&mut self, keys: Option<&BTreeSet<DailyKey>>) -> Result<()> {
        let tx = self.conn.transaction()?;
        let stats = daily_stats::compute(&tx, keys)?;
        daily_stats::replace(&tx, keys, &stats)?;
        tx.commit()?;
        Ok(())
    }

    // --- reads --------------------------------------------------------------

    /// Rollups as they would be recomputed right now from session rows.
    pub fn compute_daily_stats(&self) -> Result<Vec<DailyStat>> {
        Ok(daily_stats::compute(&self.conn, None)?)
    }

    pub fn list_daily_stats(&self, project_name: Option<&str>) -> Result<Vec<DailyStat>> {
        daily_stats::list(&self.conn, project_name)
    }

    /// Per-date totals across all projects, computed from session rows.
    /// `project_name` is [`ALL_PROJECTS`](crate::ALL_PROJECTS).
    pub fn list_daily_totals(&self) -> Result<Vec<DailyStat>> {
        Ok(daily_stats::totals(&self.conn)?)
    }

    pub fn get_ingest_entry(&self, source_file: &str) -> Result<Option<IngestLogEntry>> {
        ingest_log::get(&self.conn, source_file)
    }

    pub fn list_ingest_log(&self) -> Result<Vec<IngestLogEntry>> {
        ingest_log::list(&self.conn)
    }

    /// A session with all of its fragments merged, work blocks included.
    pub fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let fragments = session::fragments(&self.conn, session_id)?;
        match session::merge_fragments(fragments) {
            Some(mut merged) => {
                merged.work_blocks = self.get_work_blocks(session_id)?;
                Ok(Some(merged))
            }
            None => Ok(None),
        }
    }

    /// Merged sessions, earliest first, optionally for one project.
    pub fn list_sessions(&self, project_name: Option<&str>) -> Result<Vec<Session>> {
        let fragments = session::list_fragments(&self.conn, project_name)?;
        session::merge_all(fragments)
            .into_iter()
            .map(|mut s| {
                s.work_blocks = self.get_work_blocks(&s.session_id)?;
                Ok(s)
            })
            .collect()
    }

    /// Messages across all fragments, chronological, with tool calls attached.
    ///
    /// Turn indices are renumbered from 0 over the merged sequence.
    pub fn get_messages(&self, session_id: &str) -> Result<Vec<Message>> {
        let rows = message::list_for_session(&self.conn, session_id)?;
        let mut calls: HashMap<(String, u64), Vec<aide_types::ToolCall>> = HashMap::new();
        for (source_file, turn_index, call) in tool_call::list_for_session(&self.conn, session_id)? {
            calls.entry((source_file, turn_index)).or_default().push(call);
        }

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(i, (source_file, mut m))| {
                if let Some(attached) = calls.remove(&(source_file, m.turn_index)) {
                    m.tool_calls = attached;
                }
                m.turn_index = i as u64;
                m
            })
            .collect())
    }

    pub fn get_work_blocks(&self, session_id: &str) -> Result<Vec<WorkBlock>> {
        work_block::list_for_session(&self.conn, session_id)
    }

    /// Session plus messages, as consumed by the analyzer.
    pub fn get_transcript(&self, session_id: &str) -> Result<Option<SessionTranscript>> {
        let Some(session) = self.get_session(session_id)? else {
            return Ok(None);
        };
        let messages = self.get_messages(session_id)?;
        Ok(Some(SessionTranscript { session, messages }))
    }

    pub fn tool_usage(&self, session_id: &str) -> Result<Vec<ToolUsage>> {
        tool_call::usage_for_session(&self.conn, session_id)
    }

    pub fn summary_stats(&self) -> Result<SummaryStats> {
        session::summary(&self.conn)
    }
}

fn delete_file_rows(tx: &Transaction<'_>, source_file: &str) -> rusqlite::Result<BTreeSet<DailyKey>> {
    let keys = session::daily_keys_for_file(tx, source_file)?;
    tool_call::delete_by_file(tx, source_file)?;
    message::delete_by_file(tx, source_file)?;
    work_block::delete_by_file(tx, source_file)?;
    session::delete_by_file(tx, source_file)?;
    Ok(keys)
}

fn write_file(
    tx: &Transaction<'_>,
    source_file: &str,
    transcripts: &[SessionTranscript],
    entry: &IngestLogEntry,
) -> rusqlite::Result<BTreeSet<DailyKey>> {
    let mut touched = delete_file_rows(tx, source_file)?;

    for transcript in transcripts {
        let s = &transcript.session;
        session::insert(tx, s)?;
        for block in &s.work_blocks {
            work_block::insert(tx, &s.session_id, source_file, block)?;
        }
        for m in &transcript.messages {
            message::insert(tx, source_file, m)?;
            for call in &m.tool_calls {
                tool_call::insert(tx, &s.session_id, source_file, m.turn_index, call)?;
            }
        }
        touched.insert(DailyKey {
            date: s.started_at.date_naive(),
            project_name: s.project_name.clone(),
        });
    }

    ingest_log::upsert(tx, entry)?;
    Ok(touched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aide_types::{
        ContentKind, IngestStatus, Role, TokenUsage, ToolCall, ToolKind,
    };
    use chrono::{DateTime, TimeZone, Utc};

    const FILE: &str = "/logs/-Users-dev-projects-shop/s1.jsonl";

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_767_600_000 + secs, 0).unwrap()
    }

    fn transcript(session_id: &str, file: &str, start: i64) -> SessionTranscript {
        let user = Message {
            session_id: session_id.to_string(),
            uuid: format!("{session_id}-u"),
            parent_uuid: None,
            turn_index: 0,
            role: Role::User,
            content_kind: ContentKind::Text,
            timestamp: at(start),
            model: None,
            api_call_id: None,
            is_api_call: false,
            usage: TokenUsage::default(),
            cost_usd: 0.0,
            content_length: 5,
            tool_calls: Vec::new(),
        };
        let assistant = Message {
            uuid: format!("{session_id}-a"),
            parent_uuid: Some(user.uuid.clone()),
            turn_index: 1,
            role: Role::Assistant,
            content_kind: ContentKind::ToolUse,
            timestamp: at(start + 10),
            model: Some("claude-sonnet-4-5".to_string()),
            api_call_id: Some(format!("{session_id}-msg")),
            is_api_call: true,
            usage: TokenUsage::new(100, 20, 0, 300),
            cost_usd: 0.25,
            content_length: 0,
            tool_calls: vec![ToolCall {
                tool_use_id: "toolu_1".to_string(),
                tool_name: "Read".to_string(),
                kind: ToolKind::Read,
                file_path: Some("/src/lib.rs".to_string()),
                is_error: true,
                timestamp: at(start + 10),
            }],
            ..user.clone()
        };

        SessionTranscript {
            session: Session {
                session_id: session_id.to_string(),
                project_path: "-Users-dev-projects-shop".to_string(),
                project_name: "shop".to_string(),
                source_file: file.to_string(),
                started_at: at(start),
                ended_at: at(start + 10),
                duration_seconds: 10,
                active_duration_seconds: 10,
                usage: TokenUsage::new(100, 20, 0, 300),
                estimated_cost_usd: 0.25,
                message_count: 2,
                user_message_count: 1,
                assistant_message_count: 1,
                tool_call_count: 1,
                read_count: 1,
                write_count: 0,
                edit_count: 0,
                command_count: 0,
                compaction_count: 0,
                peak_context_tokens: 400,
                work_blocks: vec![WorkBlock {
                    index: 0,
                    started_at: at(start),
                    ended_at: at(start + 10),
                    active_seconds: 10,
                    message_count: 2,
                }],
            },
            messages: vec![user, assistant],
        }
    }

    fn entry(file: &str, sessions: u64) -> IngestLogEntry {
        IngestLogEntry {
            source_file: file.to_string(),
            file_size: 1234,
            mtime_ns: 1_767_600_000_123_456_789,
            status: if sessions > 0 {
                IngestStatus::Ok
            } else {
                IngestStatus::Empty
            },
            session_count: sessions,
            skipped_lines: 0,
            ingested_at: at(100),
        }
    }

    #[test]
    fn test_round_trip_transcript() {
        let mut db = Database::open_in_memory().unwrap();
        let t = transcript("s1", FILE, 0);
        db.replace_file(FILE, std::slice::from_ref(&t), &entry(FILE, 1))
            .unwrap();

        let loaded = db.get_transcript("s1").unwrap().unwrap();
        assert_eq!(loaded, t);
        assert_eq!(db.get_ingest_entry(FILE).unwrap(), Some(entry(FILE, 1)));
    }

    #[test]
    fn test_replace_supersedes_previous_rows() {
        let mut db = Database::open_in_memory().unwrap();
        db.replace_file(FILE, &[transcript("s1", FILE, 0)], &entry(FILE, 1))
            .unwrap();
        let touched = db
            .replace_file(FILE, &[transcript("s2", FILE, 86_400)], &entry(FILE, 1))
            .unwrap();

        assert!(db.get_session("s1").unwrap().is_none());
        assert!(db.get_session("s2").unwrap().is_some());
        assert_eq!(touched.len(), 2);
        assert_eq!(db.list_ingest_log().unwrap().len(), 1);
    }

    #[test]
    fn test_daily_stats_rebuild_matches_recompute() {
        let mut db = Database::open_in_memory().unwrap();
        let other = "/logs/-Users-dev-projects-shop/s2.jsonl";
        let mut touched = db
            .replace_file(FILE, &[transcript("s1", FILE, 0)], &entry(FILE, 1))
            .unwrap();
        touched.extend(
            db.replace_file(other, &[transcript("s2", other, 60)], &entry(other, 1))
                .unwrap(),
        );
        db.rebuild_daily_stats(Some(&touched)).unwrap();

        let stored = db.list_daily_stats(None).unwrap();
        assert_eq!(stored, db.compute_daily_stats().unwrap());
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].session_count, 2);
        assert_eq!(stored[0].message_count, 4);
        assert_eq!(stored[0].estimated_cost_usd, 0.5);
    }

    #[test]
    fn test_daily_totals_span_projects() {
        let mut db = Database::open_in_memory().unwrap();
        let other = "/logs/-Users-dev-projects-blog/s2.jsonl";
        let mut blog = transcript("s2", other, 60);
        blog.session.project_name = "blog".to_string();
        let mut touched = db
            .replace_file(FILE, &[transcript("s1", FILE, 0)], &entry(FILE, 1))
            .unwrap();
        touched.extend(db.replace_file(other, &[blog], &entry(other, 1)).unwrap());
        db.rebuild_daily_stats(Some(&touched)).unwrap();

        assert_eq!(db.list_daily_stats(None).unwrap().len(), 2);
        let totals = db.list_daily_totals().unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].project_name, crate::ALL_PROJECTS);
        assert_eq!(totals[0].session_count, 2);
        assert_eq!(totals[0].message_count, 4);
        assert_eq!(totals[0].estimated_cost_usd, 0.5);
        // Totals are never stored
        assert!(db.list_daily_stats(Some(crate::ALL_PROJECTS)).unwrap().is_empty());
    }

    #[test]
    fn test_forget_file_clears_rows_and_rollups() {
        let mut db = Database::open_in_memory().unwrap();
        let touched = db
            .replace_file(FILE, &[transcript("s1", FILE, 0)], &entry(FILE, 1))
            .unwrap();
        db.rebuild_daily_stats(Some(&touched)).unwrap();

        let forgotten = db.forget_file(FILE).unwrap();
        db.rebuild_daily_stats(Some(&forgotten)).unwrap();

        assert!(db.get_session("s1").unwrap().is_none());
        assert!(db.list_ingest_log().unwrap().is_empty());
        assert!(db.list_daily_stats(None).unwrap().is_empty());
    }

    #[test]
    fn test_resumed_session_fragments_merge_on_read() {
        let mut db = Database::open_in_memory().unwrap();
        let second = "/logs/-Users-dev-projects-shop/s1-resumed.jsonl";
        db.replace_file(FILE, &[transcript("s1", FILE, 0)], &entry(FILE, 1))
            .unwrap();
        db.replace_file(second, &[transcript("s1", second, 3_600)], &entry(second, 1))
            .unwrap();

        let merged = db.get_session("s1").unwrap().unwrap();
        assert_eq!(merged.message_count, 4);
        assert_eq!(merged.duration_seconds, 3_610);
        assert_eq!(merged.work_blocks.len(), 2);
        assert_eq!(merged.work_blocks[1].index, 1);

        let messages = db.get_messages("s1").unwrap();
        let turns: Vec<u64> = messages.iter().map(|m| m.turn_index).collect();
        assert_eq!(turns, vec![0, 1, 2, 3]);
        assert_eq!(messages[3].tool_calls.len(), 1);
        assert_eq!(db.list_sessions(Some("shop")).unwrap().len(), 1);
    }

    #[test]
    fn test_tool_usage_and_summary() {
        let mut db = Database::open_in_memory().unwrap();
        db.replace_file(FILE, &[transcript("s1", FILE, 0)], &entry(FILE, 1))
            .unwrap();

        let usage = db.tool_usage("s1").unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].count, 1);
        assert_eq!(usage[0].error_count, 1);

        let summary = db.summary_stats().unwrap();
        assert_eq!(summary.total_sessions, 1);
        assert_eq!(summary.project_count, 1);
        assert_eq!(summary.first_date, Some(at(0).date_naive()));
        assert_eq!(summary.projects[0].project_name, "shop");
    }

    #[test]
    fn test_truncate_all() {
        let mut db = Database::open_in_memory().unwrap();
        db.replace_file(FILE, &[transcript("s1", FILE, 0)], &entry(FILE, 1))
            .unwrap();
        db.truncate_all().unwrap();
        assert!(db.list_sessions(None).unwrap().is_empty());
        assert!(db.list_ingest_log().unwrap().is_empty());
    }

    #[test]
    fn test_missing_session_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_transcript("nope").unwrap().is_none());
    }
}
