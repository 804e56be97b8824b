//! Configuration management for tscell.
//!
//! Handles loading configuration from TOML files and environment variables.
//! Precedence, lowest first: built-in defaults, config file, environment,
//! command-line flags.

use crate::coordinator::FailurePolicy;
use crate::error::{CellError, Result};
use crate::output::{parse_time_zone, OutputFormat, RenderOptions, TimeDisplay, DEFAULT_MAX_ROWS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for tscell.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Statement execution settings.
    #[serde(default)]
    pub interpreter: InterpreterConfig,

    /// Result rendering settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Engine settings.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Statement execution settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct InterpreterConfig {
    /// What to do after a statement fails: "continue" or "stop".
    #[serde(default)]
    pub on_error: FailurePolicy,
}

/// Result rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    /// Output format: "text" or "json".
    #[serde(default)]
    pub format: OutputFormat,

    /// Time column format: "long", "iso8601" or a strftime pattern.
    #[serde(default = "default_time_display")]
    pub time_display: String,

    /// Fixed UTC offset used for formatted times (e.g., "+08:00").
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Maximum rows rendered per table.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

fn default_time_display() -> String {
    "long".to_string()
}

fn default_time_zone() -> String {
    "+00:00".to_string()
}

fn default_max_rows() -> usize {
    DEFAULT_MAX_ROWS
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            time_display: default_time_display(),
            time_zone: default_time_zone(),
            max_rows: default_max_rows(),
        }
    }
}

impl OutputConfig {
    /// Builds render options, validating the time settings.
    pub fn render_options(&self) -> Result<RenderOptions> {
        if self.max_rows == 0 {
            return Err(CellError::config("max_rows must be at least 1"));
        }
        Ok(RenderOptions {
            time_display: TimeDisplay::parse(&self.time_display)?,
            time_zone: parse_time_zone(&self.time_zone)?,
            max_rows: self.max_rows,
        })
    }
}

/// Engine settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EngineConfig {
    /// Create missing series on insert instead of failing.
    #[serde(default)]
    pub auto_create_schema: bool,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tscell")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CellError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            CellError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies `TSCELL_*` environment variables on top of the file values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(policy) = lookup("TSCELL_ON_ERROR") {
            self.interpreter.on_error = FailurePolicy::parse(&policy).ok_or_else(|| {
                CellError::config(format!("TSCELL_ON_ERROR: unknown failure policy '{policy}'"))
            })?;
        }
        if let Some(format) = lookup("TSCELL_OUTPUT") {
            self.output.format = format
                .parse()
                .map_err(|e| CellError::config(format!("TSCELL_OUTPUT: {e}")))?;
        }
        if let Some(display) = lookup("TSCELL_TIME_DISPLAY") {
            self.output.time_display = display;
        }
        if let Some(zone) = lookup("TSCELL_TIME_ZONE") {
            self.output.time_zone = zone;
        }
        if let Some(max_rows) = lookup("TSCELL_MAX_ROWS") {
            self.output.max_rows = max_rows.parse().map_err(|_| {
                CellError::config(format!("TSCELL_MAX_ROWS: expected a number, got '{max_rows}'"))
            })?;
        }
        Ok(())
    }
}
