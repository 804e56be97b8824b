//! Statement segmentation.
//!
//! Splits a script on `;` and flattens each statement onto a single line.
//! Every line break and every tab inside a statement is replaced by exactly
//! one space, without collapsing runs, so a newline followed by an
//! indentation tab becomes two spaces.
//!
//! Semicolons are always delimiters. A `;` inside a string literal splits
//! the statement there; quoting is not recognized.

use serde::Serialize;
use std::fmt;

/// One normalized statement, ready to be handed to the engine.
///
/// Never empty, never contains `;`, `\n`, `\r` or `\t`, and carries no
/// leading or trailing whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Statement(String);

impl Statement {
    /// Normalizes a single statement.
    ///
    /// Returns `None` if the text is blank or holds more than one statement.
    pub fn new(text: &str) -> Option<Self> {
        let mut statements = segment(text);
        if statements.len() == 1 {
            statements.pop()
        } else {
            None
        }
    }

    /// Returns the statement text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the statement, returning the owned text.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the leading keyword, uppercased.
    pub fn keyword(&self) -> String {
        self.0
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_uppercase()
    }

    /// Returns true if the statement reads data rather than changing it.
    ///
    /// Only a hint for rendering and logging; dispatch never depends on it.
    pub fn is_query(&self) -> bool {
        matches!(self.keyword().as_str(), "SELECT" | "SHOW" | "LIST" | "COUNT")
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Statement {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Statement {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Statement {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Splits a script into normalized statements.
///
/// Total over any input: blank scripts, trailing delimiters and `;;` simply
/// produce fewer statements. Statements keep their order of appearance.
pub fn segment(script: &str) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut buffer = String::with_capacity(script.len().min(4096));
    let mut chars = script.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ';' => flush(&mut buffer, &mut statements),
            '\r' => {
                // CRLF is one line break
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                buffer.push(' ');
            }
            '\n' | '\t' => buffer.push(' '),
            _ => buffer.push(c),
        }
    }

    flush(&mut buffer, &mut statements);
    statements
}

/// Emits the buffered candidate if it is non-blank, then resets the buffer.
fn flush(buffer: &mut String, statements: &mut Vec<Statement>) {
    let candidate = buffer.trim();
    if !candidate.is_empty() {
        statements.push(Statement(candidate.to_string()));
    }
    buffer.clear();
}
