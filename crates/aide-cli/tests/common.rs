#![allow(dead_code)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const SESSION_ID: &str = "8a3f5c2e-1b7d-4e9a-9c61-2f0d7b4e5a10";
const PROJECT_DIR: &str = "-Users-dev-projects-shop";

/// Workspace with a config file pointing at a private log tree.
pub struct TestFixture {
    _temp_dir: TempDir,
    config_path: PathBuf,
    log_root: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let workspace = temp_dir.path().join("workspace");
        let log_root = temp_dir.path().join("logs");
        fs::create_dir_all(&workspace).expect("Failed to create workspace");
        fs::create_dir_all(log_root.join(PROJECT_DIR)).expect("Failed to create log dir");

        let config_path = workspace.join("config.toml");
        fs::write(
            &config_path,
            format!("log_dir = {:?}\n", log_root.to_string_lossy()),
        )
        .expect("Failed to write config");

        Self {
            _temp_dir: temp_dir,
            config_path,
            log_root,
        }
    }

    pub fn copy_sample(&self, name: &str) {
        let source = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../aide-providers/tests/samples")
            .join(name);
        fs::copy(source, self.log_root.join(PROJECT_DIR).join(name))
            .expect("Failed to copy sample");
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn write_config(&self, content: &str) {
        fs::write(&self.config_path, content).expect("Failed to write config");
    }

    pub fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("aide");
        cmd.arg("--config")
            .arg(&self.config_path)
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    pub fn ingest(&self) {
        self.command().arg("ingest").assert().success();
    }
}
