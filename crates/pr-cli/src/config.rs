use std::path::PathBuf;

use anyhow::{Context, Result};
use pr_compiler::DEFAULT_MAX_OPERATIONS;

pub(crate) const ENV_SCRIPTS_DIR: &str = "PREMIUM_SCRIPTS_DIR";
pub(crate) const ENV_LOG: &str = "PREMIUM_LOG";
pub(crate) const ENV_MAX_OPERATIONS: &str = "PREMIUM_MAX_OPERATIONS";
pub(crate) const ENV_CURRENT_YEAR: &str = "PREMIUM_CURRENT_YEAR";

/// Process configuration read from the environment. Command-line flags take
/// precedence over these values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CliConfig {
    /// Rule scripts directory; the bundled scripts are used when unset.
    pub(crate) scripts_dir: Option<PathBuf>,
    pub(crate) log_level: String,
    pub(crate) max_operations: u64,
    /// Pins the rating year; the system clock is used when unset.
    pub(crate) current_year: Option<i32>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            scripts_dir: None,
            log_level: "info".to_string(),
            max_operations: DEFAULT_MAX_OPERATIONS,
            current_year: None,
        }
    }
}

impl CliConfig {
    pub(crate) fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(dir) = lookup(ENV_SCRIPTS_DIR).filter(|value| !value.trim().is_empty()) {
            cfg.scripts_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = lookup(ENV_LOG).filter(|value| !value.trim().is_empty()) {
            cfg.log_level = level;
        }
        if let Some(raw) = lookup(ENV_MAX_OPERATIONS) {
            cfg.max_operations = raw.trim().parse::<u64>().with_context(|| {
                format!("{} must be a positive integer, got {:?}", ENV_MAX_OPERATIONS, raw)
            })?;
        }
        if let Some(raw) = lookup(ENV_CURRENT_YEAR) {
            let year = raw
                .trim()
                .parse::<i32>()
                .with_context(|| format!("{} must be a year, got {:?}", ENV_CURRENT_YEAR, raw))?;
            cfg.current_year = Some(year);
        }

        Ok(cfg)
    }
}
