#![allow(dead_code)]

use aide_index::Database;
use aide_runtime::{Config, IngestMode, IngestService, IngestSummary};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PROJECT_DIR: &str = "-Users-dev-projects-shop";
pub const SESSION_ID: &str = "8a3f5c2e-1b7d-4e9a-9c61-2f0d7b4e5a10";

pub fn sample(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../aide-providers/tests/samples")
        .join(name)
}

/// Workspace with a log tree holding the given sample files.
pub struct Fixture {
    pub dir: TempDir,
    pub config: Config,
}

impl Fixture {
    pub fn new(samples: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = Config::for_workspace(dir.path());
        config.log_dir = dir.path().join("logs");

        let project = config.log_dir.join(PROJECT_DIR);
        std::fs::create_dir_all(&project).unwrap();
        for name in samples {
            std::fs::copy(sample(name), project.join(name)).unwrap();
        }

        Self { dir, config }
    }

    pub fn log_file(&self, name: &str) -> PathBuf {
        self.config.log_dir.join(PROJECT_DIR).join(name)
    }

    pub fn open(&self) -> Database {
        Database::open(&self.config.db_path).unwrap()
    }

    pub fn ingest(&self, mode: IngestMode) -> IngestSummary {
        let mut db = self.open();
        IngestService::new(&mut db, &self.config)
            .run(mode, |_| {})
            .unwrap()
    }
}
