//! Interpret entry point: segment a cell, then run its statements.

use std::sync::Arc;

use tracing::debug;

use super::{AggregatedResult, ExecutionCoordinator, FailurePolicy};
use crate::engine::QueryEngine;
use crate::error::Result;
use crate::script::segment;

/// Interprets whole scripts against one engine.
///
/// The engine is shared state between calls; the interpreter itself keeps
/// nothing from one call to the next.
pub struct Interpreter {
    engine: Arc<dyn QueryEngine>,
    policy: FailurePolicy,
}

impl Interpreter {
    /// Creates an interpreter over the given engine.
    pub fn new(engine: Arc<dyn QueryEngine>, policy: FailurePolicy) -> Self {
        Self { engine, policy }
    }

    /// Returns the engine handle.
    pub fn engine(&self) -> &Arc<dyn QueryEngine> {
        &self.engine
    }

    /// Segments the script and executes its statements in order.
    pub async fn interpret(&self, script: &str) -> AggregatedResult {
        let statements = segment(script);
        debug!(count = statements.len(), "Segmented script");
        ExecutionCoordinator::new(self.engine.as_ref(), self.policy)
            .run(statements)
            .await
    }

    /// Closes the underlying engine.
    pub async fn close(&self) -> Result<()> {
        self.engine.close().await
    }
}
