//! Script handling for tscell.
//!
//! Turns the raw text of a notebook cell into the ordered list of
//! single-line statements that get dispatched to the engine.

pub mod segmenter;

pub use segmenter::{segment, Statement};
