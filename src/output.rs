//! Rendering of interpretation results.
//!
//! Converts an `AggregatedResult` into the messages a notebook shows: one
//! per executed statement, in order, plus the overall status. Tables render
//! as tab separated text, acknowledgements as a fixed line, failures as the
//! engine diagnostic.

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::coordinator::{AggregatedResult, ResultCode, StatementOutcome};
use crate::engine::{QueryResult, Value};
use crate::error::{CellError, Result};
use crate::script::Statement;

/// Message shown for statements that return no table.
pub const SQL_EXECUTED: &str = "Sql executed.";

/// Default number of rows rendered per table.
pub const DEFAULT_MAX_ROWS: usize = 1000;

/// Output format for rendered results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text, one block per statement.
    #[default]
    Text,
    /// JSON document with status code and messages.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// How the `Time` column is shown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TimeDisplay {
    /// Milliseconds since the epoch.
    #[default]
    Long,
    /// RFC 3339 with millisecond precision.
    Iso8601,
    /// A strftime pattern.
    Pattern(String),
}

impl TimeDisplay {
    /// Parses `long`, `iso8601` or a strftime pattern.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "long" | "default" => Ok(Self::Long),
            "iso8601" | "iso" => Ok(Self::Iso8601),
            _ => {
                let pattern = s.trim();
                if pattern.is_empty()
                    || StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
                {
                    return Err(CellError::config(format!(
                        "Invalid time display '{s}'. Expected long, iso8601 or a strftime pattern"
                    )));
                }
                Ok(Self::Pattern(pattern.to_string()))
            }
        }
    }
}

/// Parses a fixed UTC offset such as `+08:00`, `-0530` or `UTC`.
pub fn parse_time_zone(s: &str) -> Result<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("utc") || s.eq_ignore_ascii_case("z") {
        return Ok(Utc.fix());
    }

    let invalid = || {
        CellError::config(format!(
            "Invalid time zone '{s}'. Expected an offset like +08:00"
        ))
    };

    let (sign, rest) = match s.chars().next() {
        Some('+') => (1, &s[1..]),
        Some('-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !matches!(digits.len(), 2 | 4) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = if digits.len() == 4 {
        digits[2..].parse().map_err(|_| invalid())?
    } else {
        0
    };
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Options controlling how tables are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub time_display: TimeDisplay,
    pub time_zone: FixedOffset,
    pub max_rows: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            time_display: TimeDisplay::Long,
            time_zone: Utc.fix(),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl RenderOptions {
    /// Formats an epoch-millisecond timestamp.
    pub fn format_time(&self, millis: i64) -> String {
        if self.time_display == TimeDisplay::Long {
            return millis.to_string();
        }
        let Some(utc) = DateTime::<Utc>::from_timestamp_millis(millis) else {
            return millis.to_string();
        };
        let local = utc.with_timezone(&self.time_zone);

        match &self.time_display {
            TimeDisplay::Long => millis.to_string(),
            TimeDisplay::Iso8601 => local.to_rfc3339_opts(SecondsFormat::Millis, false),
            TimeDisplay::Pattern(pattern) => {
                let mut out = String::new();
                match write!(out, "{}", local.format(pattern)) {
                    Ok(()) => out,
                    Err(_) => millis.to_string(),
                }
            }
        }
    }

    /// Formats one cell.
    pub fn render_value(&self, value: &Value) -> String {
        match value {
            Value::Timestamp(millis) => self.format_time(*millis),
            other => other.to_display_string(),
        }
    }

    /// Renders a statement result as text.
    ///
    /// Tables become a header line followed by one line per row, cells
    /// separated by tabs, with no trailing newline.
    pub fn render_result(&self, result: &QueryResult) -> String {
        if result.is_acknowledgement() {
            return SQL_EXECUTED.to_string();
        }

        let mut lines = Vec::with_capacity(result.row_count().min(self.max_rows) + 2);
        lines.push(
            result
                .columns
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join("\t"),
        );
        lines.extend(result.rows.iter().take(self.max_rows).map(|row| {
            row.iter()
                .map(|value| self.render_value(value))
                .collect::<Vec<_>>()
                .join("\t")
        }));

        if result.row_count() > self.max_rows {
            lines.push(format!(
                "Result truncated: showing {} of {} rows",
                self.max_rows,
                result.row_count()
            ));
        }

        lines.join("\n")
    }
}

/// Kind of a rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    Table,
    Text,
    Error,
}

/// Rendered output of one statement.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub statement: Statement,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub data: String,
    /// Engine time for the statement; JSON only.
    pub elapsed_ms: u64,
}

/// Rendered output of a whole interpretation request.
#[derive(Debug, Clone, Serialize)]
pub struct CellOutput {
    pub code: ResultCode,
    pub messages: Vec<Message>,
    pub skipped: Vec<Statement>,
}

impl CellOutput {
    /// Renders every outcome of an aggregated result.
    pub fn from_result(result: &AggregatedResult, options: &RenderOptions) -> Self {
        let messages = result
            .outcomes
            .iter()
            .map(|outcome| {
                let (kind, data) = match outcome {
                    StatementOutcome::Success { result, .. } => (
                        if result.is_acknowledgement() {
                            MessageType::Text
                        } else {
                            MessageType::Table
                        },
                        options.render_result(result),
                    ),
                    StatementOutcome::Failure { diagnostic, .. } => {
                        (MessageType::Error, diagnostic.clone())
                    }
                };
                Message {
                    statement: outcome.statement().clone(),
                    kind,
                    data,
                    elapsed_ms: u64::try_from(outcome.elapsed().as_millis()).unwrap_or(u64::MAX),
                }
            })
            .collect();

        Self {
            code: result.status,
            messages,
            skipped: result.skipped.clone(),
        }
    }

    /// Renders as plain text: message blocks separated by blank lines.
    pub fn to_text(&self) -> String {
        let mut blocks: Vec<String> = self.messages.iter().map(|m| m.data.clone()).collect();
        if !self.skipped.is_empty() {
            blocks.push(
                self.skipped
                    .iter()
                    .map(|s| format!("Not executed: {s}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
        blocks.join("\n\n")
    }

    /// Renders as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CellError::internal(format!("Failed to serialize output: {e}")))
    }

    /// Renders in the requested format.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => self.to_json(),
        }
    }
}
