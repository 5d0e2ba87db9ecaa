//! Byte offset to `file:line:column` resolution.
//!
//! A [`PositionTable`] is built once per parsed source and shared read-only by
//! every normalizer call that needs to attach a position to a canonical node.

use std::fmt;

use serde::Serialize;

/// A resolved source location. Lines and columns are 1-based; columns count bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub filename: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    /// The zeroed position used when no location data is available.
    pub fn zeroed() -> Self {
        Self::marker("")
    }

    /// Fixed position carried by error documents raised before any file is read.
    pub fn toplevel() -> Self {
        Self::marker("<toplevel>")
    }

    /// Fixed position carried by syntax errors that have no location of their own.
    pub fn invalid() -> Self {
        Self::marker("<invalid>")
    }

    fn marker(filename: &str) -> Self {
        Self {
            filename: filename.to_string(),
            line: 0,
            column: 0,
            offset: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return if self.filename.is_empty() {
                f.write_str("-")
            } else {
                f.write_str(&self.filename)
            };
        }
        if self.filename.is_empty() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.filename, self.line, self.column)
        }
    }
}

/// Line-start index for one source text.
#[derive(Debug, Clone, Default)]
pub struct PositionTable {
    filename: String,
    line_starts: Vec<usize>,
    len: usize,
}

impl PositionTable {
    pub fn new(filename: impl Into<String>, source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                source
                    .bytes()
                    .enumerate()
                    .filter(|(_, b)| *b == b'\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();
        Self {
            filename: filename.into(),
            line_starts,
            len: source.len(),
        }
    }

    /// A table with no data; every lookup resolves to the zeroed position.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Resolves `offset`. Offsets past the end of the source resolve to the zeroed position.
    pub fn resolve(&self, offset: usize) -> Position {
        if self.line_starts.is_empty() || offset > self.len {
            return Position::zeroed();
        }
        let line = self.line_starts.partition_point(|start| *start <= offset);
        let line_start = self.line_starts[line - 1];
        Position {
            filename: self.filename.clone(),
            line,
            column: offset - line_start + 1,
            offset,
        }
    }

    /// 1-based line of `offset`, or 0 when out of range.
    pub fn line_of(&self, offset: usize) -> usize {
        self.resolve(offset).line
    }
}
