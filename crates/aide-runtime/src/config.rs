use crate::{Error, Result};
use aide_engine::{DiagnosticsConfig, ModelRates, PricingTable, RecommendationThresholds};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";
const DB_FILE: &str = "aide.db";
const DEFAULT_LOG_DIR: &str = "~/.claude/projects";

/// Resolve the workspace data directory path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. AIDE_PATH environment variable (with tilde expansion)
/// 3. XDG data directory
/// 4. ~/.aide
pub fn resolve_workspace_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("AIDE_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("aide"));
    }

    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".aide"));
    }

    Err(Error::Config(
        "Could not determine workspace path: no home or data directory found".to_string(),
    ))
}

/// Expand a leading `~` to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return home;
    }
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

/// `[pricing]` section: replaces the default rate and adds or overrides
/// model-prefix entries of the built-in table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingOverrides {
    pub default: Option<ModelRates>,
    pub models: BTreeMap<String, ModelRates>,
}

impl PricingOverrides {
    pub fn apply(&self, table: &mut PricingTable) {
        if let Some(rates) = self.default {
            table.default = rates;
        }
        for (prefix, rates) in &self.models {
            table.insert(prefix.clone(), *rates);
        }
    }
}

/// On-disk shape; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    log_dir: Option<String>,
    db_path: Option<String>,
    subscription_user: bool,
    pricing: PricingOverrides,
    diagnostics: DiagnosticsConfig,
    thresholds: RecommendationThresholds,
}

/// Resolved configuration handed to the ingest and diagnose operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root of the Claude Code project log tree
    pub log_dir: PathBuf,
    pub db_path: PathBuf,
    /// Only changes how costs are labeled, never the amounts
    pub subscription_user: bool,
    pub pricing: PricingTable,
    pub diagnostics: DiagnosticsConfig,
    pub thresholds: RecommendationThresholds,
}

impl Config {
    /// Defaults for a workspace directory, with no config file involved.
    pub fn for_workspace(workspace: &Path) -> Self {
        Self {
            log_dir: expand_tilde(DEFAULT_LOG_DIR),
            db_path: workspace.join(DB_FILE),
            subscription_user: false,
            pricing: PricingTable::default_claude(),
            diagnostics: DiagnosticsConfig::default(),
            thresholds: RecommendationThresholds::default(),
        }
    }

    /// Load from an explicit config file, or from `<workspace>/config.toml`.
    pub fn load(explicit_config: Option<&Path>) -> Result<Self> {
        match explicit_config {
            Some(path) => {
                let workspace = path.parent().unwrap_or_else(|| Path::new("."));
                Self::load_from(path, workspace)
            }
            None => {
                let workspace = resolve_workspace_path(None)?;
                Self::load_from(&workspace.join(CONFIG_FILE), &workspace)
            }
        }
    }

    /// A missing file yields the defaults.
    pub fn load_from(path: &Path, workspace: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::for_workspace(workspace));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content, workspace).map_err(|err| match err {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    pub fn from_toml(content: &str, workspace: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        let mut config = Self::for_workspace(workspace);

        if let Some(log_dir) = file.log_dir {
            config.log_dir = expand_tilde(&log_dir);
        }
        if let Some(db_path) = file.db_path {
            config.db_path = expand_tilde(&db_path);
        }
        config.subscription_user = file.subscription_user;
        file.pricing.apply(&mut config.pricing);
        config.diagnostics = file.diagnostics;
        config.thresholds = file.thresholds;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let fraction = self.diagnostics.compaction_drop_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(Error::Config(format!(
                "diagnostics.compaction_drop_fraction must be between 0 and 1, got {}",
                fraction
            )));
        }
        if self.diagnostics.context_window == 0 {
            return Err(Error::Config(
                "diagnostics.context_window must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
