//! Statement execution and result aggregation for tscell.
//!
//! This module isolates per-statement dispatch and the interpret entry point
//! from rendering and the CLI.

pub mod executor;
pub mod interpreter;

pub use executor::{
    AggregatedResult, ExecutionCoordinator, FailurePolicy, ResultCode, StatementOutcome,
};
pub use interpreter::Interpreter;
