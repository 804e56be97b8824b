//! Schema and data held by the in-memory engine.

use super::parser::{Command, Projection, TimeFilter};
use super::status;
use crate::engine::{ColumnInfo, QueryResult, Row, Value};
use crate::error::{CellError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Data types a time series can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    Text,
}

impl DataType {
    /// Returns the type name as shown in result sets.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Int32 => "INT32",
            Self::Int64 => "INT64",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Text => "TEXT",
        }
    }

    /// Parses a type name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "BOOLEAN" => Some(Self::Boolean),
            "INT32" => Some(Self::Int32),
            "INT64" => Some(Self::Int64),
            "FLOAT" => Some(Self::Float),
            "DOUBLE" => Some(Self::Double),
            "TEXT" => Some(Self::Text),
            _ => None,
        }
    }

    /// Picks a type for a literal when a series is created on insert.
    ///
    /// Numbers become FLOAT, quoted literals TEXT.
    pub fn infer(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("false") {
            Some(Self::Boolean)
        } else if unquote(raw).is_some() {
            Some(Self::Text)
        } else if raw.parse::<f64>().is_ok_and(f64::is_finite) {
            Some(Self::Float)
        } else {
            None
        }
    }

    /// Converts a literal into a value of this type.
    pub fn parse_value(&self, raw: &str) -> Option<Value> {
        match self {
            Self::Boolean => match raw.to_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            Self::Int32 => raw.parse().ok().map(Value::Int32),
            Self::Int64 => raw.parse().ok().map(Value::Int64),
            Self::Float => raw
                .parse::<f32>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::Float),
            Self::Double => raw
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::Double),
            Self::Text => Some(Value::Text(unquote(raw).unwrap_or(raw).to_string())),
        }
    }
}

fn unquote(raw: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|q| {
        raw.strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
            .filter(|_| raw.len() >= 2)
    })
}

/// Returns true if `prefix` names `path` or one of its ancestors.
fn is_prefix(prefix: &str, path: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('.'))
}

fn parent(path: &str) -> &str {
    path.rsplit_once('.').map_or("", |(parent, _)| parent)
}

#[derive(Debug)]
struct Series {
    data_type: DataType,
    encoding: String,
    storage_group: String,
    created: u64,
    points: BTreeMap<i64, Value>,
}

/// All storage groups and series known to one engine.
#[derive(Debug, Default)]
pub struct Store {
    storage_groups: BTreeSet<String>,
    series: BTreeMap<String, Series>,
    next_created: u64,
}

impl Store {
    /// Applies a parsed command, returning its result.
    pub fn apply(&mut self, command: Command, auto_create_schema: bool) -> Result<QueryResult> {
        match command {
            Command::SetStorageGroup(path) => self.set_storage_group(path),
            Command::CreateTimeseries {
                path,
                data_type,
                encoding,
            } => self.create_timeseries(path, data_type, encoding),
            Command::Insert {
                device,
                timestamp,
                measurements,
                values,
            } => self.insert(&device, timestamp, &measurements, &values, auto_create_schema),
            Command::Select {
                device,
                projection,
                filter,
            } => self.select(&device, &projection, &filter),
            Command::ShowStorageGroups => Ok(self.show_storage_groups()),
            Command::ShowTimeseries { prefix } => Ok(self.show_timeseries(prefix.as_deref())),
            Command::DeleteTimeseries(path) => self.delete_timeseries(&path),
        }
    }

    fn set_storage_group(&mut self, path: String) -> Result<QueryResult> {
        self.check_storage_group(&path)?;
        self.storage_groups.insert(path);
        Ok(QueryResult::acknowledged())
    }

    fn check_storage_group(&self, path: &str) -> Result<()> {
        if !path.contains('.') {
            return Err(CellError::execution(
                status::SYNTAX_ERROR,
                format!("storage group must be below root, got '{path}'"),
            ));
        }
        if let Some(existing) = self
            .storage_groups
            .iter()
            .find(|sg| is_prefix(sg, path) || is_prefix(path, sg))
        {
            let msg = if existing == path {
                format!("storage group {path} already exists")
            } else {
                format!("storage group {path} overlaps existing storage group {existing}")
            };
            return Err(CellError::execution(status::ALREADY_EXISTS, msg));
        }
        Ok(())
    }

    fn storage_group_of(&self, path: &str) -> Option<&str> {
        self.storage_groups
            .iter()
            .find(|sg| is_prefix(sg, path))
            .map(String::as_str)
    }

    fn create_timeseries(
        &mut self,
        path: String,
        data_type: DataType,
        encoding: String,
    ) -> Result<QueryResult> {
        let storage_group = self
            .storage_group_of(&path)
            .ok_or_else(|| {
                CellError::execution(
                    status::STORAGE_GROUP_NOT_SET,
                    format!("storage group is not set for path {path}"),
                )
            })?
            .to_string();
        if storage_group == path {
            return Err(CellError::execution(
                status::SYNTAX_ERROR,
                format!("timeseries {path} must be below its storage group"),
            ));
        }
        if self.series.contains_key(&path) {
            return Err(CellError::execution(
                status::ALREADY_EXISTS,
                format!("timeseries {path} already exists"),
            ));
        }
        self.add_series(path, data_type, encoding, storage_group);
        Ok(QueryResult::acknowledged())
    }

    fn add_series(
        &mut self,
        path: String,
        data_type: DataType,
        encoding: String,
        storage_group: String,
    ) {
        let created = self.next_created;
        self.next_created += 1;
        self.series.insert(
            path,
            Series {
                data_type,
                encoding,
                storage_group,
                created,
                points: BTreeMap::new(),
            },
        );
    }

    fn insert(
        &mut self,
        device: &str,
        timestamp: i64,
        measurements: &[String],
        values: &[String],
        auto_create_schema: bool,
    ) -> Result<QueryResult> {
        if !device.contains('.') {
            return Err(CellError::execution(
                status::SYNTAX_ERROR,
                format!("cannot insert directly into '{device}'"),
            ));
        }

        // Validate every value before writing any of them.
        let mut points = Vec::with_capacity(measurements.len());
        let mut new_series = Vec::new();
        for (measurement, raw) in measurements.iter().zip(values) {
            let path = format!("{device}.{measurement}");
            if raw.eq_ignore_ascii_case("null") {
                continue;
            }
            let data_type = match self.series.get(&path) {
                Some(series) => series.data_type,
                None if auto_create_schema => {
                    let data_type = DataType::infer(raw).ok_or_else(|| {
                        CellError::execution(
                            status::TYPE_MISMATCH,
                            format!("cannot infer a data type for {path} from '{raw}'"),
                        )
                    })?;
                    new_series.push((path.clone(), data_type));
                    data_type
                }
                None => {
                    return Err(CellError::execution(
                        status::PATH_NOT_EXIST,
                        format!("timeseries {path} does not exist"),
                    ))
                }
            };
            let value = data_type.parse_value(raw).ok_or_else(|| {
                CellError::execution(
                    status::TYPE_MISMATCH,
                    format!(
                        "data type mismatch for {path}: expected {}, got '{raw}'",
                        data_type.as_str()
                    ),
                )
            })?;
            points.push((path, value));
        }

        if !new_series.is_empty() {
            let storage_group = self.ensure_storage_group(device)?;
            for (path, data_type) in new_series {
                self.add_series(path, data_type, "PLAIN".to_string(), storage_group.clone());
            }
        }

        for (path, value) in points {
            if let Some(series) = self.series.get_mut(&path) {
                series.points.insert(timestamp, value);
            }
        }
        Ok(QueryResult::acknowledged())
    }

    /// Returns the storage group covering `device`, creating `root.<first level>` if none does.
    fn ensure_storage_group(&mut self, device: &str) -> Result<String> {
        if let Some(existing) = self.storage_group_of(device) {
            return Ok(existing.to_string());
        }
        let candidate = device.split('.').take(2).collect::<Vec<_>>().join(".");
        self.check_storage_group(&candidate).map_err(|_| {
            CellError::execution(
                status::STORAGE_GROUP_NOT_SET,
                format!("storage group is not set for device {device}"),
            )
        })?;
        self.storage_groups.insert(candidate.clone());
        Ok(candidate)
    }

    fn select(
        &self,
        device: &str,
        projection: &Projection,
        filter: &TimeFilter,
    ) -> Result<QueryResult> {
        let selected: Vec<(&String, &Series)> = match projection {
            Projection::All => {
                let mut all: Vec<_> = self
                    .series
                    .iter()
                    .filter(|(path, _)| parent(path) == device)
                    .collect();
                all.sort_by_key(|(_, series)| series.created);
                all
            }
            Projection::Measurements(measurements) => measurements
                .iter()
                .map(|measurement| {
                    let path = format!("{device}.{measurement}");
                    self.series.get_key_value(&path).ok_or_else(|| {
                        CellError::execution(
                            status::PATH_NOT_EXIST,
                            format!("timeseries {path} does not exist"),
                        )
                    })
                })
                .collect::<Result<_>>()?,
        };

        let mut columns = vec![ColumnInfo::time()];
        columns.extend(
            selected
                .iter()
                .map(|(path, series)| ColumnInfo::new(path.as_str(), series.data_type.as_str())),
        );

        let timestamps: BTreeSet<i64> = selected
            .iter()
            .flat_map(|(_, series)| series.points.keys().copied())
            .filter(|t| filter.matches(*t))
            .collect();

        let rows: Vec<Row> = timestamps
            .into_iter()
            .map(|t| {
                let mut row = Vec::with_capacity(columns.len());
                row.push(Value::Timestamp(t));
                row.extend(
                    selected
                        .iter()
                        .map(|(_, series)| series.points.get(&t).cloned().unwrap_or_default()),
                );
                row
            })
            .collect();

        Ok(QueryResult::with_data(columns, rows))
    }

    fn show_storage_groups(&self) -> QueryResult {
        let rows = self
            .storage_groups
            .iter()
            .map(|sg| vec![Value::from(sg.as_str())])
            .collect();
        QueryResult::with_data(vec![ColumnInfo::new("storage group", "TEXT")], rows)
    }

    fn show_timeseries(&self, prefix: Option<&str>) -> QueryResult {
        let columns = vec![
            ColumnInfo::new("timeseries", "TEXT"),
            ColumnInfo::new("storage group", "TEXT"),
            ColumnInfo::new("dataType", "TEXT"),
            ColumnInfo::new("encoding", "TEXT"),
        ];
        let rows = self
            .series
            .iter()
            .filter(|(path, _)| prefix.map_or(true, |p| is_prefix(p, path)))
            .map(|(path, series)| {
                vec![
                    Value::from(path.as_str()),
                    Value::from(series.storage_group.as_str()),
                    Value::from(series.data_type.as_str()),
                    Value::from(series.encoding.as_str()),
                ]
            })
            .collect();
        QueryResult::with_data(columns, rows)
    }

    fn delete_timeseries(&mut self, path: &str) -> Result<QueryResult> {
        self.series.remove(path).ok_or_else(|| {
            CellError::execution(
                status::PATH_NOT_EXIST,
                format!("timeseries {path} does not exist"),
            )
        })?;
        Ok(QueryResult::acknowledged())
    }
}
