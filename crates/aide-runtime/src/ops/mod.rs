pub mod diagnose;
pub mod ingest;

pub use diagnose::{Diagnosis, diagnose};
pub use ingest::{
    FileAction, FileFingerprint, IngestMode, IngestProgress, IngestService, IngestSummary, decide,
};
