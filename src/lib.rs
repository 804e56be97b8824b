//! tscell - a notebook-cell interpreter for time-series database scripts.
//!
//! A cell is split into single-line statements by [`script::segment`],
//! executed in order by [`coordinator::ExecutionCoordinator`] against a
//! [`engine::QueryEngine`], and rendered by [`output::CellOutput`].

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod logging;
pub mod output;
pub mod script;
