use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aide")]
#[command(about = "Ingest Claude Code session logs and diagnose token spend", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: <workspace>/config.toml, workspace from AIDE_PATH)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Ignored when RUST_LOG is set
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bring the store up to date with the log directory
    Ingest {
        /// Truncate the store and re-parse every file
        #[arg(long)]
        full: bool,

        /// Print one line per processed file
        #[arg(long, short)]
        verbose: bool,

        #[arg(long)]
        json: bool,
    },

    /// Cost breakdown, context curve and recommendations for one session
    Diagnose {
        session_id: String,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}
