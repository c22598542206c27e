// SQLite store for parsed sessions
// Rows for a source file are replaced as a unit; daily rollups are recomputed, never patched

mod db;
mod error;
mod queries;
mod records;
mod schema;

// Public API
pub use db::Database;
pub use error::{Error, Result};
pub use queries::daily_stats::ALL_PROJECTS;
pub use records::{ProjectTotals, SummaryStats, ToolUsage};
pub use schema::SCHEMA_VERSION;
