use aide_engine::{CostWarning, enrich_transcript};
use aide_index::Database;
use aide_providers::{ParseOutcome, discover_log_files, parse_file};
use aide_types::{DailyKey, IngestLogEntry, IngestStatus, SessionTranscript};
use chrono::Utc;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::{Config, Result};

/// What the store compares against to decide whether a file changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFingerprint {
    pub size: u64,
    /// Nanoseconds since the Unix epoch; negative before it.
    pub mtime_ns: i64,
}

impl FileFingerprint {
    pub fn from_metadata(metadata: &Metadata) -> std::io::Result<Self> {
        let modified = metadata.modified()?;
        let mtime_ns = match modified.duration_since(UNIX_EPOCH) {
            Ok(after) => i64::try_from(after.as_nanos()).unwrap_or(i64::MAX),
            Err(before) => -i64::try_from(before.duration().as_nanos()).unwrap_or(i64::MAX),
        };
        Ok(Self {
            size: metadata.len(),
            mtime_ns,
        })
    }

    pub fn read(path: &Path) -> std::io::Result<Self> {
        Self::from_metadata(&std::fs::metadata(path)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// Only files that are new or whose modification time moved
    Incremental,
    /// Truncate everything and treat every file as unseen
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Skip,
    ParseAndReplace,
}

/// Per-file transition: unseen and changed files are parsed, unchanged ones skipped.
pub fn decide(
    live: &FileFingerprint,
    entry: Option<&IngestLogEntry>,
    mode: IngestMode,
) -> FileAction {
    match (mode, entry) {
        (IngestMode::Full, _) | (IngestMode::Incremental, None) => FileAction::ParseAndReplace,
        (IngestMode::Incremental, Some(entry)) if entry.mtime_ns == live.mtime_ns => {
            FileAction::Skip
        }
        (IngestMode::Incremental, Some(_)) => FileAction::ParseAndReplace,
    }
}

#[derive(Debug, Clone)]
pub enum IngestProgress {
    LogRootMissing { log_root: PathBuf },
    Discovered { files: usize },
    FileUnchanged { path: String },
    FileIngested { path: String, sessions: usize, skipped_lines: u64 },
    FileMalformed { path: String, reason: String },
    FileForgotten { path: String },
    Completed(IngestSummary),
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub files_discovered: usize,
    pub files_parsed: usize,
    pub files_unchanged: usize,
    pub files_malformed: usize,
    pub files_forgotten: usize,
    pub sessions_persisted: usize,
    pub skipped_lines: u64,
    pub rejected_sessions: usize,
    /// Models priced at the default rate during this run
    pub unknown_models: Vec<String>,
}

struct ParsedFile {
    key: String,
    fingerprint: FileFingerprint,
    result: aide_providers::Result<(ParseOutcome, Vec<CostWarning>)>,
}

pub struct IngestService<'a> {
    db: &'a mut Database,
    config: &'a Config,
}

impl<'a> IngestService<'a> {
    pub fn new(db: &'a mut Database, config: &'a Config) -> Self {
        Self { db, config }
    }

    /// Bring the store up to date with the log tree.
    ///
    /// Parsing runs in parallel; persistence is sequential with one
    /// transaction per file, so an error leaves every file either fully old
    /// or fully new. Rollups for every touched (date, project) are then
    /// recomputed.
    pub fn run<F>(&mut self, mode: IngestMode, mut on_progress: F) -> Result<IngestSummary>
    where
        F: FnMut(IngestProgress),
    {
        let config = self.config;
        let log_root = &config.log_dir;
        let mut summary = IngestSummary::default();

        let root_exists = log_root.is_dir();
        if !root_exists {
            tracing::warn!(path = %log_root.display(), "log directory does not exist");
            on_progress(IngestProgress::LogRootMissing {
                log_root: log_root.clone(),
            });
        }

        if mode == IngestMode::Full {
            tracing::info!("full rebuild: truncating store");
            self.db.truncate_all()?;
        }

        let files = discover_log_files(log_root);
        summary.files_discovered = files.len();
        on_progress(IngestProgress::Discovered { files: files.len() });

        let known: HashMap<String, IngestLogEntry> = self
            .db
            .list_ingest_log()?
            .into_iter()
            .map(|entry| (entry.source_file.clone(), entry))
            .collect();

        let mut seen = HashSet::new();
        let mut pending = Vec::new();
        for path in files {
            let key = path.to_string_lossy().into_owned();
            seen.insert(key.clone());

            let fingerprint = match FileFingerprint::read(&path) {
                Ok(fingerprint) => fingerprint,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "cannot stat log file");
                    continue;
                }
            };

            match decide(&fingerprint, known.get(&key), mode) {
                FileAction::Skip => {
                    summary.files_unchanged += 1;
                    on_progress(IngestProgress::FileUnchanged { path: key });
                }
                FileAction::ParseAndReplace => pending.push((path, key, fingerprint)),
            }
        }

        let parsed = parse_all(pending, config);

        let mut touched: BTreeSet<DailyKey> = BTreeSet::new();
        let mut unknown_models = BTreeSet::new();
        for file in parsed {
            let (transcripts, entry) = match file.result {
                Ok((outcome, warnings)) => {
                    for CostWarning::UnknownModel { model } in warnings {
                        if unknown_models.insert(model.clone()) {
                            tracing::warn!(model = %model, "unknown model, priced at default rates");
                        }
                    }
                    record_outcome(
                        &file.key,
                        file.fingerprint,
                        outcome,
                        &mut summary,
                        &mut on_progress,
                    )
                }
                Err(err) => {
                    tracing::warn!(path = %file.key, error = %err, "unreadable log file");
                    summary.files_malformed += 1;
                    on_progress(IngestProgress::FileMalformed {
                        path: file.key.clone(),
                        reason: err.to_string(),
                    });
                    (
                        Vec::new(),
                        log_entry(&file.key, file.fingerprint, IngestStatus::Malformed, 0, 0),
                    )
                }
            };

            touched.extend(self.db.replace_file(&file.key, &transcripts, &entry)?);
            summary.files_parsed += 1;
            summary.sessions_persisted += transcripts.len();
        }

        // A missing root more likely means an unmounted tree than deleted logs.
        if root_exists && mode == IngestMode::Incremental {
            for source_file in known.keys() {
                if seen.contains(source_file) || !Path::new(source_file).starts_with(log_root) {
                    continue;
                }
                tracing::info!(path = %source_file, "log file vanished, forgetting");
                touched.extend(self.db.forget_file(source_file)?);
                summary.files_forgotten += 1;
                on_progress(IngestProgress::FileForgotten {
                    path: source_file.clone(),
                });
            }
        }

        match mode {
            IngestMode::Full => self.db.rebuild_daily_stats(None)?,
            IngestMode::Incremental if !touched.is_empty() => {
                self.db.rebuild_daily_stats(Some(&touched))?
            }
            IngestMode::Incremental => {}
        }

        summary.unknown_models = unknown_models.into_iter().collect();
        tracing::info!(
            discovered = summary.files_discovered,
            parsed = summary.files_parsed,
            unchanged = summary.files_unchanged,
            malformed = summary.files_malformed,
            forgotten = summary.files_forgotten,
            sessions = summary.sessions_persisted,
            skipped_lines = summary.skipped_lines,
            "ingest complete"
        );
        on_progress(IngestProgress::Completed(summary.clone()));

        Ok(summary)
    }
}

/// Turn a parse outcome into rows plus the file's ingest-log entry.
fn record_outcome<F>(
    key: &str,
    fingerprint: FileFingerprint,
    outcome: ParseOutcome,
    summary: &mut IngestSummary,
    on_progress: &mut F,
) -> (Vec<SessionTranscript>, IngestLogEntry)
where
    F: FnMut(IngestProgress),
{
    let sessions = outcome.transcripts.len();
    summary.skipped_lines += outcome.skipped_lines;
    summary.rejected_sessions += outcome.rejected_sessions.len();

    let rejected = outcome.rejected_sessions.len();
    let status = match (sessions, outcome.skipped_lines, rejected) {
        (0, 0, 0) => IngestStatus::Empty,
        (0, _, _) => IngestStatus::Malformed,
        _ => IngestStatus::Ok,
    };

    if status == IngestStatus::Malformed {
        tracing::warn!(
            path = %key,
            skipped_lines = outcome.skipped_lines,
            rejected_sessions = rejected,
            "no usable sessions in log file"
        );
        summary.files_malformed += 1;
        let reason = if rejected > 0 {
            format!(
                "{} unparsable lines, {} sessions without timestamps",
                outcome.skipped_lines, rejected
            )
        } else {
            format!("{} unparsable lines", outcome.skipped_lines)
        };
        on_progress(IngestProgress::FileMalformed {
            path: key.to_string(),
            reason,
        });
    } else {
        on_progress(IngestProgress::FileIngested {
            path: key.to_string(),
            sessions,
            skipped_lines: outcome.skipped_lines,
        });
    }

    let entry = log_entry(key, fingerprint, status, sessions as u64, outcome.skipped_lines);
    (outcome.transcripts, entry)
}

/// Parse and enrich every pending file in parallel, keeping discovery order.
fn parse_all(pending: Vec<(PathBuf, String, FileFingerprint)>, config: &Config) -> Vec<ParsedFile> {
    pending
        .into_par_iter()
        .map(|(path, key, fingerprint)| {
            let result = parse_file(&path).map(|mut outcome| {
                let warnings = enrich_all(&mut outcome.transcripts, config);
                (outcome, warnings)
            });
            ParsedFile {
                key,
                fingerprint,
                result,
            }
        })
        .collect()
}

fn enrich_all(transcripts: &mut [SessionTranscript], config: &Config) -> Vec<CostWarning> {
    let mut warnings = BTreeSet::new();
    for transcript in transcripts {
        warnings.extend(enrich_transcript(
            transcript,
            &config.pricing,
            &config.diagnostics,
        ));
    }
    warnings.into_iter().collect()
}

fn log_entry(
    key: &str,
    fingerprint: FileFingerprint,
    status: IngestStatus,
    session_count: u64,
    skipped_lines: u64,
) -> IngestLogEntry {
    IngestLogEntry {
        source_file: key.to_string(),
        file_size: fingerprint.size,
        mtime_ns: fingerprint.mtime_ns,
        status,
        session_count,
        skipped_lines,
        ingested_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mtime_ns: i64, size: u64) -> IngestLogEntry {
        IngestLogEntry {
            source_file: "/logs/p/a.jsonl".to_string(),
            file_size: size,
            mtime_ns,
            status: IngestStatus::Ok,
            session_count: 1,
            skipped_lines: 0,
            ingested_at: Utc::now(),
        }
    }

    #[test]
    fn test_unseen_file_is_parsed() {
        let live = FileFingerprint { size: 10, mtime_ns: 5 };
        assert_eq!(
            decide(&live, None, IngestMode::Incremental),
            FileAction::ParseAndReplace
        );
    }

    #[test]
    fn test_unchanged_mtime_is_skipped() {
        let live = FileFingerprint { size: 10, mtime_ns: 5 };
        assert_eq!(
            decide(&live, Some(&entry(5, 10)), IngestMode::Incremental),
            FileAction::Skip
        );
    }

    #[test]
    fn test_changed_mtime_is_replaced() {
        let live = FileFingerprint { size: 10, mtime_ns: 6 };
        assert_eq!(
            decide(&live, Some(&entry(5, 10)), IngestMode::Incremental),
            FileAction::ParseAndReplace
        );
    }

    #[test]
    fn test_full_mode_ignores_log() {
        let live = FileFingerprint { size: 10, mtime_ns: 5 };
        assert_eq!(
            decide(&live, Some(&entry(5, 10)), IngestMode::Full),
            FileAction::ParseAndReplace
        );
    }

    #[test]
    fn test_fingerprint_reads_nanoseconds() -> std::io::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("a.jsonl");
        std::fs::write(&path, "{}\n")?;
        filetime::set_file_mtime(&path, filetime::FileTime::from_unix_time(1_700_000_000, 123))?;

        let fingerprint = FileFingerprint::read(&path)?;
        assert_eq!(fingerprint.size, 3);
        assert_eq!(fingerprint.mtime_ns, 1_700_000_000_000_000_123);
        Ok(())
    }
}
