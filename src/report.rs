//! Positioning for schema-compiler diagnostics.
//!
//! Validation runs the external TypeSpec compiler over the generated
//! document. The compiler reports byte offsets; these helpers map them
//! back to line and column so a failure points at the offending
//! statement.

use serde::Deserialize;

/// The severity of a compiler diagnostic. Only errors fail a run.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic reported against the generated document.
#[derive(Clone, Debug, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Byte offset into the document, when the compiler provides one.
    #[serde(default)]
    pub offset: Option<usize>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Formats this diagnostic with its position in the document.
    pub fn located(&self, path: &str, index: &LineIndex) -> String {
        match self.offset {
            Some(offset) => {
                let position = index.position(offset);
                format!(
                    "{} @ {path}:{}:{}",
                    self.message, position.line, position.column
                )
            }
            None => self.message.clone(),
        }
    }
}

/// A 1-based line and column.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A table of line-start offsets for one document.
#[derive(Debug)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, byte)| byte == b'\n')
                .map(|(offset, _)| offset + 1),
        );
        Self { starts }
    }

    /// Returns the position of a byte offset. Offsets past the end of
    /// the document land on the last line.
    pub fn position(&self, offset: usize) -> Position {
        let line = self.starts.partition_point(|&start| start <= offset);
        Position {
            line,
            column: offset - self.starts[line - 1] + 1,
        }
    }
}
