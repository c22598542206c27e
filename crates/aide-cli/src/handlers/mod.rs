pub mod diagnose;
pub mod ingest;
