//! In-memory time-series engine.
//!
//! Holds storage groups, series and points in process memory so scripts can
//! be interpreted without a database server.

mod parser;
mod store;

pub use store::DataType;

use super::{QueryEngine, QueryResult};
use crate::error::{CellError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use store::Store;
use tracing::debug;

/// Status codes carried by execution errors.
pub mod status {
    /// Storage group or series already exists.
    pub const ALREADY_EXISTS: u16 = 303;
    /// Series does not exist.
    pub const PATH_NOT_EXIST: u16 = 304;
    /// No storage group covers the path.
    pub const STORAGE_GROUP_NOT_SET: u16 = 305;
    /// Value does not fit the series data type.
    pub const TYPE_MISMATCH: u16 = 306;
    /// Column and value counts differ.
    pub const ARITY_MISMATCH: u16 = 307;
    /// Statement could not be parsed.
    pub const SYNTAX_ERROR: u16 = 401;
    /// Engine was closed.
    pub const ENGINE_CLOSED: u16 = 500;
}

/// Query engine backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    store: Mutex<Store>,
    auto_create_schema: bool,
    closed: AtomicBool,
}

impl MemoryEngine {
    /// Creates an empty engine that requires explicit schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates missing series (and storage groups) on insert when enabled.
    pub fn with_auto_create_schema(mut self, enabled: bool) -> Self {
        self.auto_create_schema = enabled;
        self
    }

    /// Returns true if inserts create missing series.
    pub fn auto_create_schema(&self) -> bool {
        self.auto_create_schema
    }
}

#[async_trait]
impl QueryEngine for MemoryEngine {
    async fn execute_statement(&self, sql: &str) -> Result<QueryResult> {
        if self.closed.load(Ordering::Acquire) {
            return Err(CellError::execution(
                status::ENGINE_CLOSED,
                "engine is closed",
            ));
        }

        let command = parser::parse(sql)?;
        debug!(?command, "Applying statement");

        let mut store = self
            .store
            .lock()
            .map_err(|_| CellError::internal("engine state lock poisoned"))?;
        store.apply(command, self.auto_create_schema)
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
