//! Sequential statement execution.
//!
//! Dispatches statements to an engine one at a time, in order, and records
//! each outcome as data. A failing statement never aborts the loop through
//! `?`; whether the remaining statements still run is decided by the
//! `FailurePolicy`.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::{QueryEngine, QueryResult};
use crate::script::Statement;

/// What to do with the remaining statements after one fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Execute every statement and report an aggregate error.
    #[default]
    Continue,
    /// Stop at the first failing statement.
    #[serde(rename = "stop", alias = "stop-on-error", alias = "halt")]
    StopOnError,
}

impl FailurePolicy {
    /// Returns the policy as it is written in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::StopOnError => "stop",
        }
    }

    /// Parses a policy name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "continue" => Some(Self::Continue),
            "stop" | "stop-on-error" | "halt" => Some(Self::StopOnError),
            _ => None,
        }
    }
}

/// Overall status of an interpretation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    Success,
    Error,
}

/// Outcome of executing one statement.
#[derive(Debug, Clone)]
pub enum StatementOutcome {
    /// The engine executed the statement.
    Success {
        statement: Statement,
        result: QueryResult,
        elapsed: Duration,
    },
    /// The engine rejected the statement.
    Failure {
        statement: Statement,
        /// Engine diagnostic, unchanged.
        diagnostic: String,
        elapsed: Duration,
    },
}

impl StatementOutcome {
    /// Returns the statement this outcome belongs to.
    pub fn statement(&self) -> &Statement {
        match self {
            Self::Success { statement, .. } | Self::Failure { statement, .. } => statement,
        }
    }

    /// Returns true if the statement succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns how long the engine took.
    pub fn elapsed(&self) -> Duration {
        match self {
            Self::Success { elapsed, .. } | Self::Failure { elapsed, .. } => *elapsed,
        }
    }
}

/// Everything one interpretation request produced.
#[derive(Debug, Clone)]
pub struct AggregatedResult {
    /// Outcomes in statement order.
    pub outcomes: Vec<StatementOutcome>,
    /// Statements left unexecuted under `FailurePolicy::StopOnError`.
    pub skipped: Vec<Statement>,
    /// `Error` iff at least one statement failed.
    pub status: ResultCode,
}

impl AggregatedResult {
    fn from_parts(outcomes: Vec<StatementOutcome>, skipped: Vec<Statement>) -> Self {
        let status = if outcomes.iter().all(StatementOutcome::is_success) {
            ResultCode::Success
        } else {
            ResultCode::Error
        };
        Self {
            outcomes,
            skipped,
            status,
        }
    }

    /// Returns true if every executed statement succeeded.
    pub fn is_success(&self) -> bool {
        self.status == ResultCode::Success
    }

    /// Returns the failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &StatementOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Returns true if no statement was executed.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Runs statements against an engine.
pub struct ExecutionCoordinator<'a> {
    engine: &'a dyn QueryEngine,
    policy: FailurePolicy,
}

impl<'a> ExecutionCoordinator<'a> {
    /// Creates a coordinator for the given engine.
    pub fn new(engine: &'a dyn QueryEngine, policy: FailurePolicy) -> Self {
        Self { engine, policy }
    }

    /// Executes the statements strictly in order.
    ///
    /// Each statement is awaited before the next one is dispatched, so later
    /// statements observe the side effects of earlier ones.
    pub async fn run(&self, statements: Vec<Statement>) -> AggregatedResult {
        let total = statements.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut skipped = Vec::new();
        let mut pending = statements.into_iter().enumerate();

        while let Some((index, statement)) = pending.next() {
            let outcome = self.execute_one(index, statement).await;
            let failed = !outcome.is_success();
            outcomes.push(outcome);

            if failed && self.policy == FailurePolicy::StopOnError {
                skipped.extend(pending.by_ref().map(|(_, statement)| statement));
                if !skipped.is_empty() {
                    warn!(
                        "Stopping after statement {} of {}: {} statement(s) not executed",
                        index + 1,
                        total,
                        skipped.len()
                    );
                }
                break;
            }
        }

        let result = AggregatedResult::from_parts(outcomes, skipped);
        info!(
            executed = result.outcomes.len(),
            failed = result.failures().count(),
            skipped = result.skipped.len(),
            "Script finished"
        );
        result
    }

    async fn execute_one(&self, index: usize, statement: Statement) -> StatementOutcome {
        debug!(
            index,
            keyword = %statement.keyword(),
            query = statement.is_query(),
            statement = %statement,
            "Dispatching statement"
        );
        let start = Instant::now();
        let result = self.engine.execute_statement(statement.as_str()).await;
        let elapsed = start.elapsed();

        match result {
            Ok(result) => {
                debug!(index, ?elapsed, rows = result.row_count(), "Statement succeeded");
                StatementOutcome::Success {
                    statement,
                    result,
                    elapsed,
                }
            }
            Err(e) => {
                warn!(index, ?elapsed, "Statement failed: {}", e);
                StatementOutcome::Failure {
                    statement,
                    diagnostic: e.to_string(),
                    elapsed,
                }
            }
        }
    }
}
