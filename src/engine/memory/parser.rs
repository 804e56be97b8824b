//! Statement grammar understood by the in-memory engine.
//!
//! Keywords are case-insensitive, series paths are not. Anything outside
//! this small grammar is reported as a syntax error with status 401.

use super::status;
use super::store::DataType;
use crate::error::{CellError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// A parsed statement, ready to be applied to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetStorageGroup(String),
    CreateTimeseries {
        path: String,
        data_type: DataType,
        encoding: String,
    },
    Insert {
        device: String,
        timestamp: i64,
        measurements: Vec<String>,
        values: Vec<String>,
    },
    Select {
        device: String,
        projection: Projection,
        filter: TimeFilter,
    },
    ShowStorageGroups,
    ShowTimeseries {
        prefix: Option<String>,
    },
    DeleteTimeseries(String),
}

/// Which measurements a `SELECT` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    All,
    Measurements(Vec<String>),
}

/// Conjunction of `time <op> <millis>` predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeFilter {
    predicates: Vec<(CompareOp, i64)>,
}

impl TimeFilter {
    /// Returns true if the timestamp satisfies every predicate.
    pub fn matches(&self, time: i64) -> bool {
        self.predicates.iter().all(|(op, bound)| op.holds(time, *bound))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
}

impl CompareOp {
    fn parse(op: &str) -> Option<Self> {
        match op {
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            "=" | "==" => Some(Self::Eq),
            "!=" | "<>" => Some(Self::Ne),
            _ => None,
        }
    }

    fn holds(self, left: i64, right: i64) -> bool {
        match self {
            Self::Gt => left > right,
            Self::Ge => left >= right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Eq => left == right,
            Self::Ne => left != right,
        }
    }
}

struct Patterns {
    set_storage_group: Regex,
    create_timeseries: Regex,
    insert: Regex,
    select: Regex,
    and: Regex,
    time_predicate: Regex,
    show_storage_groups: Regex,
    show_timeseries: Regex,
    delete_timeseries: Regex,
    path: Regex,
    identifier: Regex,
}

impl Patterns {
    fn compile() -> Self {
        let re = |pattern: &str| Regex::new(pattern).expect("statement pattern is valid");
        Self {
            set_storage_group: re(r"(?i)^SET\s+STORAGE\s+GROUP\s+TO\s+(\S+)$"),
            create_timeseries: re(r"(?i)^CREATE\s+TIMESERIES\s+(\S+)\s+WITH\s+(.+)$"),
            insert: re(
                r"(?i)^INSERT\s+INTO\s+([^\s(]+)\s*\(([^)]*)\)\s*VALUES\s*\((.*)\)$",
            ),
            select: re(r"(?i)^SELECT\s+(.+?)\s+FROM\s+(\S+)(?:\s+WHERE\s+(.+))?$"),
            and: re(r"(?i)\s+AND\s+"),
            time_predicate: re(r"(?i)^time\s*(>=|<=|!=|<>|==|=|>|<)\s*(-?\d+)$"),
            show_storage_groups: re(r"(?i)^SHOW\s+STORAGE\s+GROUPS?$"),
            show_timeseries: re(r"(?i)^SHOW\s+TIMESERIES(?:\s+(\S+))?$"),
            delete_timeseries: re(r"(?i)^DELETE\s+TIMESERIES\s+(\S+)$"),
            path: re(r"^root(\.[A-Za-z0-9_]+)*$"),
            identifier: re(r"^[A-Za-z0-9_]+$"),
        }
    }
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(Patterns::compile)
}

/// Parses one statement.
pub fn parse(sql: &str) -> Result<Command> {
    let sql = sql.trim();
    let p = patterns();

    if let Some(caps) = p.set_storage_group.captures(sql) {
        return Ok(Command::SetStorageGroup(parse_path(&caps[1])?));
    }

    if let Some(caps) = p.create_timeseries.captures(sql) {
        return parse_create_timeseries(&caps[1], &caps[2]);
    }

    if let Some(caps) = p.insert.captures(sql) {
        return parse_insert(&caps[1], &caps[2], &caps[3]);
    }

    if let Some(caps) = p.select.captures(sql) {
        let device = parse_path(&caps[2])?;
        let projection = parse_projection(&caps[1])?;
        let filter = match caps.get(3) {
            Some(clause) => parse_where(clause.as_str())?,
            None => TimeFilter::default(),
        };
        return Ok(Command::Select {
            device,
            projection,
            filter,
        });
    }

    if p.show_storage_groups.is_match(sql) {
        return Ok(Command::ShowStorageGroups);
    }

    if let Some(caps) = p.show_timeseries.captures(sql) {
        let prefix = caps.get(1).map(|m| parse_path(m.as_str())).transpose()?;
        return Ok(Command::ShowTimeseries { prefix });
    }

    if let Some(caps) = p.delete_timeseries.captures(sql) {
        return Ok(Command::DeleteTimeseries(parse_path(&caps[1])?));
    }

    Err(syntax_error(format!("cannot parse statement '{sql}'")))
}

fn syntax_error(msg: impl Into<String>) -> CellError {
    CellError::execution(status::SYNTAX_ERROR, msg)
}

fn parse_path(raw: &str) -> Result<String> {
    if patterns().path.is_match(raw) {
        Ok(raw.to_string())
    } else {
        Err(syntax_error(format!(
            "illegal path '{raw}', paths start with 'root' and use '.' separated names"
        )))
    }
}

fn parse_identifier(raw: &str) -> Result<String> {
    let name = raw.trim();
    if patterns().identifier.is_match(name) {
        Ok(name.to_string())
    } else {
        Err(syntax_error(format!("illegal measurement name '{name}'")))
    }
}

fn parse_create_timeseries(path: &str, attributes: &str) -> Result<Command> {
    let path = parse_path(path)?;
    let mut data_type = None;
    let mut encoding = "PLAIN".to_string();

    for attribute in split_list(attributes) {
        let (key, value) = attribute
            .split_once('=')
            .ok_or_else(|| syntax_error(format!("expected KEY=VALUE, got '{attribute}'")))?;
        let value = value.trim();
        match key.trim().to_uppercase().as_str() {
            "DATATYPE" => {
                data_type = Some(DataType::parse(value).ok_or_else(|| {
                    syntax_error(format!("unsupported data type '{value}'"))
                })?);
            }
            "ENCODING" => encoding = value.to_uppercase(),
            "COMPRESSOR" | "COMPRESSION" => {}
            other => return Err(syntax_error(format!("unknown attribute '{other}'"))),
        }
    }

    let data_type = data_type.ok_or_else(|| syntax_error("DATATYPE is required"))?;
    Ok(Command::CreateTimeseries {
        path,
        data_type,
        encoding,
    })
}

fn parse_insert(device: &str, columns: &str, values: &str) -> Result<Command> {
    let device = parse_path(device)?;
    let columns: Vec<&str> = columns.split(',').map(str::trim).collect();
    let values = split_list(values);

    let (time_column, measurements) = columns
        .split_first()
        .ok_or_else(|| syntax_error("INSERT needs a column list"))?;
    if !time_column.eq_ignore_ascii_case("timestamp") && !time_column.eq_ignore_ascii_case("time")
    {
        return Err(syntax_error(format!(
            "first INSERT column must be 'timestamp', got '{time_column}'"
        )));
    }
    if measurements.is_empty() {
        return Err(syntax_error("INSERT needs at least one measurement"));
    }
    let measurements = measurements
        .iter()
        .map(|m| parse_identifier(m))
        .collect::<Result<Vec<_>>>()?;

    if values.len() != columns.len() {
        return Err(CellError::execution(
            status::ARITY_MISMATCH,
            format!(
                "expected {} values for {} columns, got {}",
                columns.len(),
                columns.len(),
                values.len()
            ),
        ));
    }

    let mut values = values.into_iter();
    let raw_time = values.next().unwrap_or_default();
    let timestamp = raw_time
        .parse::<i64>()
        .map_err(|_| syntax_error(format!("invalid timestamp '{raw_time}'")))?;

    Ok(Command::Insert {
        device,
        timestamp,
        measurements,
        values: values.collect(),
    })
}

fn parse_projection(raw: &str) -> Result<Projection> {
    if raw.trim() == "*" {
        return Ok(Projection::All);
    }
    raw.split(',')
        .map(parse_identifier)
        .collect::<Result<Vec<_>>>()
        .map(Projection::Measurements)
}

fn parse_where(clause: &str) -> Result<TimeFilter> {
    let p = patterns();
    let mut predicates = Vec::new();

    for predicate in p.and.split(clause.trim()) {
        let caps = p
            .time_predicate
            .captures(predicate.trim())
            .ok_or_else(|| syntax_error(format!("unsupported predicate '{predicate}'")))?;
        let op = CompareOp::parse(&caps[1])
            .ok_or_else(|| syntax_error(format!("unsupported operator '{}'", &caps[1])))?;
        let bound = caps[2]
            .parse::<i64>()
            .map_err(|_| syntax_error(format!("time bound out of range '{}'", &caps[2])))?;
        predicates.push((op, bound));
    }

    Ok(TimeFilter { predicates })
}

/// Splits a comma separated list, leaving commas inside quotes alone.
fn split_list(input: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                current.push(c);
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                ',' => {
                    items.push(current.trim().to_string());
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }

    items.push(current.trim().to_string());
    items
}
