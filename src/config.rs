//! Dashboard configuration
//!
//! Layered: built-in defaults, then a JSON config file, then CLI overrides.
//! The config file is `--config PATH` or `~/.dealerdash/config.json` when present.

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::types::{Country, DashError, Result};

pub const DEFAULT_FRANCE_CSV: &str = "data_desudo_france.csv";
pub const DEFAULT_ITALY_CSV: &str = "data_desudo_italy.csv";
pub const DEFAULT_ACTIVE_MARKER: &str = "LIVE";
pub const DEFAULT_TOP_VARIANCE_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub france_csv: PathBuf,
    pub italy_csv: PathBuf,
    /// Month (1-12) in which the fiscal year begins
    pub fiscal_year_start_month: u32,
    /// Status substring (case-insensitive) that marks a contract active
    pub active_status_marker: String,
    pub top_variance_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            france_csv: PathBuf::from(DEFAULT_FRANCE_CSV),
            italy_csv: PathBuf::from(DEFAULT_ITALY_CSV),
            fiscal_year_start_month: 1,
            active_status_marker: DEFAULT_ACTIVE_MARKER.to_string(),
            top_variance_rows: DEFAULT_TOP_VARIANCE_ROWS,
        }
    }
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub france_csv: Option<PathBuf>,
    pub italy_csv: Option<PathBuf>,
    pub fiscal_year_start_month: Option<u32>,
    pub active_status_marker: Option<String>,
}

impl Config {
    /// Default config file location: `~/.dealerdash/config.json`
    pub fn default_path() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.home_dir().join(".dealerdash").join("config.json"))
    }

    /// Read and validate a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the effective config.
    ///
    /// An explicit path must exist; the default path is used only if present.
    pub fn resolve(explicit: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let base = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.is_file() => {
                    tracing::debug!(path = %path.display(), "using default config file");
                    Self::from_file(&path)?
                }
                _ => Self::default(),
            },
        };
        let config = base.with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(path) = overrides.france_csv {
            self.france_csv = path;
        }
        if let Some(path) = overrides.italy_csv {
            self.italy_csv = path;
        }
        if let Some(month) = overrides.fiscal_year_start_month {
            self.fiscal_year_start_month = month;
        }
        if let Some(marker) = overrides.active_status_marker {
            self.active_status_marker = marker;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=12).contains(&self.fiscal_year_start_month) {
            return Err(DashError::Config(format!(
                "fiscal_year_start_month must be 1-12, got {}",
                self.fiscal_year_start_month
            )));
        }
        if self.active_status_marker.trim().is_empty() {
            return Err(DashError::Config(
                "active_status_marker must not be empty".into(),
            ));
        }
        if self.top_variance_rows == 0 {
            return Err(DashError::Config(
                "top_variance_rows must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Configured CSV path for a source country
    pub fn source_path(&self, country: Country) -> &Path {
        match country {
            Country::France => &self.france_csv,
            Country::Italy => &self.italy_csv,
        }
    }
}
