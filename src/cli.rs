//! Command-line argument parsing for tscell.
//!
//! Uses clap to parse CLI arguments.

use crate::config::Config;
use crate::coordinator::FailurePolicy;
use crate::error::{CellError, Result};
use crate::output::OutputFormat;
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;

/// Interprets time-series database scripts the way a notebook cell does.
#[derive(Parser, Debug)]
#[command(name = "tscell")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Script file to interpret (use "-" for stdin)
    #[arg(value_name = "SCRIPT", conflicts_with = "execute")]
    pub script: Option<String>,

    /// Script text to interpret
    #[arg(short = 'e', long, value_name = "TEXT")]
    pub execute: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// What to do after a statement fails: continue or stop
    #[arg(long, value_name = "POLICY")]
    pub on_error: Option<String>,

    /// Output format: text or json
    #[arg(long, value_name = "FORMAT")]
    pub output: Option<String>,

    /// Time column format: long, iso8601 or a strftime pattern
    #[arg(long, value_name = "FORMAT")]
    pub time_display: Option<String>,

    /// UTC offset for formatted times (e.g., +08:00)
    #[arg(long, value_name = "OFFSET", allow_hyphen_values = true)]
    pub time_zone: Option<String>,

    /// Maximum rows rendered per table
    #[arg(long, value_name = "N")]
    pub max_rows: Option<usize>,

    /// Script executed before SCRIPT; its results are not printed
    #[arg(long, value_name = "PATH")]
    pub seed: Option<PathBuf>,

    /// Create missing series on insert
    #[arg(long)]
    pub auto_create_schema: bool,

    /// Print the segmented statements, one per line, without executing them
    #[arg(long)]
    pub split_only: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Parses the --on-error argument, if given.
    pub fn parse_failure_policy(&self) -> Result<Option<FailurePolicy>> {
        self.on_error
            .as_deref()
            .map(|policy| {
                FailurePolicy::parse(policy).ok_or_else(|| {
                    CellError::config(format!(
                        "Invalid failure policy: {policy}. Expected: continue or stop"
                    ))
                })
            })
            .transpose()
    }

    /// Parses the --output argument, if given.
    pub fn parse_output_format(&self) -> Result<Option<OutputFormat>> {
        self.output
            .as_deref()
            .map(|format| format.parse().map_err(CellError::config))
            .transpose()
    }

    /// Applies command-line flags on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(policy) = self.parse_failure_policy()? {
            config.interpreter.on_error = policy;
        }
        if let Some(format) = self.parse_output_format()? {
            config.output.format = format;
        }
        if let Some(display) = &self.time_display {
            config.output.time_display = display.clone();
        }
        if let Some(zone) = &self.time_zone {
            config.output.time_zone = zone.clone();
        }
        if let Some(max_rows) = self.max_rows {
            config.output.max_rows = max_rows;
        }
        if self.auto_create_schema {
            config.engine.auto_create_schema = true;
        }
        Ok(())
    }

    /// Reads the script text from --execute, a file, or stdin.
    pub fn read_script(&self) -> Result<String> {
        if let Some(text) = &self.execute {
            return Ok(text.clone());
        }
        match self.script.as_deref() {
            Some("-") => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(|e| CellError::io(format!("Failed to read stdin: {e}")))?;
                Ok(buffer)
            }
            Some(path) => std::fs::read_to_string(path)
                .map_err(|e| CellError::io(format!("Failed to read script '{path}': {e}"))),
            None => Err(CellError::config(
                "No script given. Pass a SCRIPT path, '-' for stdin, or --execute TEXT",
            )),
        }
    }

    /// Reads the seed script, if one was given.
    pub fn read_seed(&self) -> Result<Option<String>> {
        self.seed
            .as_ref()
            .map(|path| {
                std::fs::read_to_string(path).map_err(|e| {
                    CellError::io(format!("Failed to read seed '{}': {e}", path.display()))
                })
            })
            .transpose()
    }
}
