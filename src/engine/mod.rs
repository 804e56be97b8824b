//! Query engine abstraction for tscell.
//!
//! The interpreter never looks inside a statement. It hands each one to a
//! `QueryEngine` and takes back either a result or an error carrying the
//! engine's diagnostic.

mod memory;
mod types;

pub use memory::{status, DataType, MemoryEngine};
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::config::EngineConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Creates the engine described by the configuration.
pub fn open(config: &EngineConfig) -> MemoryEngine {
    MemoryEngine::new().with_auto_create_schema(config.auto_create_schema)
}

/// Trait defining the interface for query engines.
///
/// One call executes exactly one normalized statement.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Executes a single statement and returns its result.
    async fn execute_statement(&self, sql: &str) -> Result<QueryResult>;

    /// Releases the engine. Later statements fail.
    async fn close(&self) -> Result<()>;
}
