// aide: two entry points over the runtime crate
// `ingest` keeps the store in sync with the log tree; `diagnose` explains one session

mod args;
mod commands;
mod handlers;
mod presentation;

pub use args::{Cli, Commands, LogLevel};
pub use commands::run;
