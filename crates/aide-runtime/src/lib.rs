// Runtime layer: configuration plus the two operations the binary exposes
// Ingest owns the per-file state machine; diagnose is a read-only query + analysis

pub mod config;
pub mod error;
pub mod ops;

pub use config::{Config, PricingOverrides, expand_tilde, resolve_workspace_path};
pub use error::{Error, Result};
pub use ops::{
    Diagnosis, FileAction, FileFingerprint, IngestMode, IngestProgress, IngestService,
    IngestSummary, decide, diagnose,
};
