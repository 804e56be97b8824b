//! Query result types for tscell.
//!
//! Defines the structures used to represent what the engine returns for a
//! single statement.

use std::fmt;

/// Result of executing one statement.
///
/// A result without columns is a plain acknowledgement (inserts, schema
/// changes). A result with columns is a table, possibly with zero rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column metadata for the result set.
    pub columns: Vec<ColumnInfo>,

    /// Rows of data, each with one value per column.
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Creates an acknowledgement for a statement that returns no table.
    pub fn acknowledged() -> Self {
        Self::default()
    }

    /// Creates a query result with the given columns and rows.
    pub fn with_data(columns: Vec<ColumnInfo>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Returns true if this result carries no table.
    pub fn is_acknowledgement(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name (a full series path for data columns).
    pub name: String,

    /// Column data type as reported by the engine.
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a new column info with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    /// Creates the leading `Time` column of a time-aligned result.
    pub fn time() -> Self {
        Self::new("Time", "TIMESTAMP")
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// A single value stored in or read from a time series.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// No value at this timestamp.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// 32-bit signed integer.
    Int32(i32),

    /// 64-bit signed integer.
    Int64(i64),

    /// Single precision float.
    Float(f32),

    /// Double precision float.
    Double(f64),

    /// Text value.
    Text(String),

    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
}

impl Value {
    /// Converts the value to its plain text form.
    ///
    /// Floats always show a fractional part (`33.0`, not `33`).
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int32(i) => i.to_string(),
            Value::Int64(i) => i.to_string(),
            Value::Float(f) => format!("{f:?}"),
            Value::Double(f) => format!("{f:?}"),
            Value::Text(s) => s.clone(),
            Value::Timestamp(ms) => ms.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}
